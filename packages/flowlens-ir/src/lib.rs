//! Flowlens IR - whole-repository code analysis engine.
//!
//! Feature-first hexagonal architecture:
//! - `shared/`   : common models (Node, Edge, Span)
//! - `features/` : vertical slices (parsing -> ir -> flow/ssa -> cross-file
//!   -> rules -> taint -> query -> watcher -> chunking/indexing -> telemetry)
//! - `pipeline/` : per-file build orchestration (cache-fronted, cross-file
//!   resolved)
//! - `config/`   : per-run build/indexing/taint configuration
//! - `errors/`   : the canonical error envelope every component folds into

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod errors;
pub mod features;
pub mod pipeline;
pub mod shared;

pub use config::{BuildConfig, IndexingMode, TaintMode};
pub use errors::{ErrorCode, FlowlensError, Result};
pub use pipeline::{build, BuildResult};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cache::{QuotaConfig, TieredCache};

    #[test]
    fn build_wires_the_full_pipeline_for_a_single_file() {
        let cache = TieredCache::new(QuotaConfig::default());
        let config = BuildConfig::default();
        let files = vec![("pkg/a.py".to_string(), "def f():\n    return 1\n".to_string())];
        let result = build("repo", "snap", "proj", &files, &cache, &config);
        assert_eq!(result.ir_documents.len(), 1);
        assert!(result.failed_files().is_empty());
    }
}
