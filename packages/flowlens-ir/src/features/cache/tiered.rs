//! Two-layer tiered cache: L1 memory + L2 disk, with promotion and an
//! in-flight dedup table for concurrent builders racing on the same key
//! (spec §4.F: "re-entrancy ... converge via an internal in-flight table").

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::error::CacheError;
use super::key::CacheKey;
use super::l1::L1Cache;
use super::l2::L2Cache;
use super::quota::{CacheStats, QuotaConfig};

pub struct TieredCache {
    l1: L1Cache,
    l2: Option<L2Cache>,
    stats: Mutex<CacheStats>,
    in_flight: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl TieredCache {
    pub fn new(quota: QuotaConfig) -> Self {
        Self {
            l1: L1Cache::new(quota),
            l2: None,
            stats: Mutex::new(CacheStats::default()),
            in_flight: DashMap::new(),
        }
    }

    pub fn with_disk(quota: QuotaConfig, disk_root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self {
            l1: L1Cache::new(quota),
            l2: Some(L2Cache::new(disk_root)?),
            stats: Mutex::new(CacheStats::default()),
            in_flight: DashMap::new(),
        })
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<Arc<Vec<u8>>>, CacheError> {
        if let Some(value) = self.l1.get(key) {
            self.stats.lock().l1_hits += 1;
            return Ok(Some(value));
        }
        self.stats.lock().l1_misses += 1;

        if let Some(l2) = &self.l2 {
            if let Some(bytes) = l2.get(key)? {
                self.stats.lock().l2_hits += 1;
                let value = Arc::new(bytes);
                // promotion: a L2 hit is republished into L1.
                self.l1.put(key.clone(), Arc::clone(&value), project_of(key));
                self.stats.lock().promotions += 1;
                return Ok(Some(value));
            }
            self.stats.lock().l2_misses += 1;
        }
        Ok(None)
    }

    pub fn put(&self, key: CacheKey, value: Vec<u8>, project_id: &str) -> Result<(), CacheError> {
        let value = Arc::new(value);
        if let Some(l2) = &self.l2 {
            l2.put(&key, &value)?;
        }
        self.l1.put(key, value, project_id);
        Ok(())
    }

    /// Acquire the in-flight lock for `key`, deduplicating concurrent
    /// builders so only one of them does the parse→IR→SSA work on a miss.
    pub fn in_flight_guard(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        Arc::clone(
            self.in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    pub fn release_in_flight(&self, key: &CacheKey) {
        self.in_flight.remove(key);
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.l1.clear();
        if let Some(l2) = &self.l2 {
            l2.clear()?;
        }
        *self.stats.lock() = CacheStats::default();
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        let mut s = self.stats.lock().clone();
        s.entries = self.l1.len();
        s
    }
}

fn project_of(_key: &CacheKey) -> &'static str {
    // The project id is not part of the cache key itself (quota accounting
    // is a cross-cutting concern); callers that care about per-project
    // quotas route through `put` directly with the real project id. L2
    // promotion has no project context available, so it is attributed to
    // a shared bucket rather than guessed.
    "__promoted__"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn l2_hit_promotes_to_l1() {
        let dir = tempdir().unwrap();
        let cache = TieredCache::with_disk(QuotaConfig::default(), dir.path()).unwrap();
        let key = CacheKey::new("f.py", "hash1", 1);
        cache.put(key.clone(), b"ir-document-bytes".to_vec(), "proj").unwrap();
        cache.l1.clear();
        assert_eq!(cache.stats().l1_hits, 0);
        let got = cache.get(&key).unwrap();
        assert_eq!(got.as_deref(), Some(&b"ir-document-bytes".to_vec()));
        assert_eq!(cache.stats().promotions, 1);
        // second read now hits L1 without touching disk.
        let _ = cache.get(&key).unwrap();
        assert_eq!(cache.stats().l1_hits, 1);
    }

    #[test]
    fn idempotent_build_records_zero_misses_on_second_run() {
        let cache = TieredCache::new(QuotaConfig::default());
        let key = CacheKey::new("f.py", "hash1", 1);
        cache.put(key.clone(), b"doc".to_vec(), "proj").unwrap();
        let _ = cache.get(&key).unwrap();
        let before = cache.stats();
        let _ = cache.get(&key).unwrap();
        let after = cache.stats();
        assert_eq!(after.l1_misses, before.l1_misses);
    }
}
