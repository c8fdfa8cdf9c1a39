//! Component D: SSA construction over per-function control flow graphs.

mod builder;
mod dominance;
mod domain;
mod error;

pub use builder::build_ssa;
pub use dominance::DominanceInfo;
pub use domain::{PhiNode, SSAFunction, SSAVariable};
pub use error::SsaError;
