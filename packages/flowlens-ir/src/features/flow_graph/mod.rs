//! Component D: block-level flow graph (BFG/CFG), the input to SSA construction.

mod builder;
mod domain;

pub use builder::CFGBuilder;
pub use domain::{BasicBlock, BlockId, BlockKind, CFGEdge, CFGEdgeType, FunctionCFG, StatementRef};
