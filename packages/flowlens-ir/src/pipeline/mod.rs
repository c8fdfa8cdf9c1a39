//! Component F: the layered IR builder, orchestrating A (cache) through E
//! (cross-file resolution) into one `build(files, config) -> BuildResult`.

mod orchestrator;
mod persistence;
mod result;

pub use orchestrator::build;
pub use persistence::{relation_rows, symbol_rows};
pub use result::BuildResult;
