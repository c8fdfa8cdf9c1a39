use crate::features::cache::CacheStats;
use crate::features::cross_file::GlobalContext;
use crate::features::ir_generation::IRDocument;

/// Output of `build` (§4.F). A per-file error never aborts the whole build;
/// it shows up as `Err` at that file's position in `ir_documents`.
pub struct BuildResult {
    pub ir_documents: Vec<(String, Result<IRDocument, String>)>,
    pub global_context: GlobalContext,
    pub cache_stats: CacheStats,
    pub diagnostics: Vec<String>,
}

impl BuildResult {
    pub fn successful_documents(&self) -> Vec<&IRDocument> {
        self.ir_documents.iter().filter_map(|(_, r)| r.as_ref().ok()).collect()
    }

    pub fn failed_files(&self) -> Vec<&str> {
        self.ir_documents
            .iter()
            .filter_map(|(path, r)| if r.is_err() { Some(path.as_str()) } else { None })
            .collect()
    }
}
