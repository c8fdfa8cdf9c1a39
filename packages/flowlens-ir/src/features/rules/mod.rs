//! Component G: taint rule compiler, multi-index, and executable IR.

mod atom;
mod compiled;
mod compiler;
mod error;
mod index;
mod pattern;
mod subsumption;

pub use atom::{AtomKind, RawCatalog, RawRule};
pub use compiled::{ArgConstraint, CompiledRule};
pub use compiler::{compile_catalog, IncrementalCompiler};
pub use error::RuleCompileError;
pub use index::RuleIndex;
pub use pattern::{glob_matches, parse_pattern, PatternAction};
