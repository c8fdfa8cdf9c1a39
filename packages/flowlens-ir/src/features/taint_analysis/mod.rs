//! Component H: atom matcher, interprocedural edge builder, and taint-flow
//! compiler built on top of the query engine (I) and rule index (G).

mod domain;
mod engine;
mod error;
mod interproc;
mod matcher;

pub use domain::{FlowPolicy, MatchedAtom, Vulnerability};
pub use engine::{compile_policies, find_vulnerabilities};
pub use error::TaintError;
pub use interproc::build_interprocedural_edges;
pub use matcher::{match_document, unmatched_call_names};
