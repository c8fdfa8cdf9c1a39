//! Component I: the query plan executor. `QueryPlan` in, `ExecutionResult`
//! out, no string-DSL in between (§3.1, §4.I).

mod error;
mod executor;
mod graph;
mod plan;
mod result;

pub use error::QueryError;
pub use executor::{execute, ExecutionCache};
pub use graph::{default_forbidden, TraversalGraph};
pub use plan::{Budget, QueryIntent, QueryKind, QueryPlan, SliceDirection, TraversalStrategy};
pub use result::{ExecutionMetadata, ExecutionResult, ExecutionStatus, PathResult, PathSet, VerificationSnapshot};
