//! `build(files, config) -> BuildResult` (§4.F): B→C→D run per file under a
//! bounded worker pool with the cache fronting each miss; E runs once over
//! the whole resolved set.

use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::config::BuildConfig;
use crate::features::cache::{CacheKey, TieredCache};
use crate::features::cross_file::{self, GlobalContext};
use crate::features::ir_generation::{self, IRDocument, IRDocumentTag};
use crate::features::parsing::{LanguageParser, PARSER_VERSION};
use crate::shared::content_hash;

use super::result::BuildResult;

/// `(repo_id, snapshot_id)` plus the set of `(file_path, content)` pairs;
/// `project_id` drives the cache's per-project quota accounting (§4.A).
#[instrument(skip(files, cache, config), fields(repo_id, snapshot_id, file_count = files.len()))]
pub fn build(
    repo_id: &str,
    snapshot_id: &str,
    project_id: &str,
    files: &[(String, String)],
    cache: &TieredCache,
    config: &BuildConfig,
) -> BuildResult {
    let workers = config.parallel_workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().expect("default rayon pool"));

    let results: Vec<(String, Result<IRDocument, String>, bool)> = pool.install(|| {
        files
            .par_iter()
            .map(|(path, content)| build_one(repo_id, snapshot_id, project_id, path, content, cache))
            .collect()
    });

    let mut ir_documents = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (path, doc, had_error) in results {
        if had_error {
            if let Err(msg) = &doc {
                warn!(file = %path, error = %msg, "file build failed");
                diagnostics.push(format!("{path}: {msg}"));
            }
        }
        ir_documents.push((path, doc));
    }

    let documents_for_resolution: Vec<IRDocument> = ir_documents
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok())
        .cloned()
        .collect();
    let global_context: GlobalContext = cross_file::resolve(&documents_for_resolution);

    BuildResult {
        ir_documents,
        global_context,
        cache_stats: cache.stats(),
        diagnostics,
    }
}

fn build_one(
    repo_id: &str,
    snapshot_id: &str,
    project_id: &str,
    path: &str,
    content: &str,
    cache: &TieredCache,
) -> (String, Result<IRDocument, String>, bool) {
    let hash = content_hash(content.as_bytes());
    let key = CacheKey::new(path, hash.clone(), PARSER_VERSION);

    let guard = cache.in_flight_guard(&key);
    let _lock = guard.lock();

    let cached = cache.get(&key).ok().flatten();
    if let Some(bytes) = cached {
        match serde_json::from_slice::<IRDocument>(&bytes) {
            Ok(doc) => {
                cache.release_in_flight(&key);
                return (path.to_string(), Ok(doc), false);
            }
            Err(_) => {
                // corrupt cache payload is treated as a miss (§7).
                warn!(file = %path, "cache payload failed to deserialize, rebuilding");
            }
        }
    }

    let result = build_fresh(repo_id, snapshot_id, path, content, hash);
    if let Ok(doc) = &result {
        if let Ok(bytes) = serde_json::to_vec(doc) {
            let _ = cache.put(key.clone(), bytes, project_id);
        }
    }
    cache.release_in_flight(&key);

    let had_error = result.is_err();
    (path.to_string(), result, had_error)
}

fn build_fresh(repo_id: &str, snapshot_id: &str, path: &str, content: &str, hash: String) -> Result<IRDocument, String> {
    let parsed = LanguageParser::parse(path, content).map_err(|e| e.to_string())?;
    let tag = IRDocumentTag {
        repo_id: repo_id.to_string(),
        snapshot_id: snapshot_id.to_string(),
        content_hash: hash,
        parser_version: PARSER_VERSION,
    };
    Ok(ir_generation::generate(repo_id, path, &parsed, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cache::QuotaConfig;

    fn files() -> Vec<(String, String)> {
        vec![
            ("pkg/util.py".to_string(), "def helper():\n    return 1\n".to_string()),
            (
                "pkg/main.py".to_string(),
                "from pkg.util import helper\n\ndef main():\n    return helper()\n".to_string(),
            ),
        ]
    }

    #[test]
    fn builds_both_files_and_resolves_cross_file_import() {
        let cache = TieredCache::new(QuotaConfig::default());
        let config = BuildConfig { parallel_workers: 2, ..BuildConfig::default() };
        let result = build("repo", "snap1", "proj", &files(), &cache, &config);

        assert_eq!(result.ir_documents.len(), 2);
        assert!(result.failed_files().is_empty());
        assert_eq!(result.global_context.stats.total_files, 2);
        assert!(result
            .global_context
            .file_dependencies
            .get("pkg/main.py")
            .map(|deps| deps.contains(&"pkg/util.py".to_string()))
            .unwrap_or(false));
    }

    #[test]
    fn second_build_of_same_content_hits_cache() {
        let cache = TieredCache::new(QuotaConfig::default());
        let config = BuildConfig::default();
        let _ = build("repo", "snap1", "proj", &files(), &cache, &config);
        let before = cache.stats().l1_hits;
        let _ = build("repo", "snap1", "proj", &files(), &cache, &config);
        assert!(cache.stats().l1_hits > before);
    }
}
