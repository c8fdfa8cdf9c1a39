//! L1: process-wide memory cache with hierarchical LRU eviction (spec §4.A).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::key::CacheKey;
use super::quota::QuotaConfig;

struct Entry {
    value: Arc<Vec<u8>>,
    project_id: String,
    last_access: u64,
}

/// Process-wide, project-partitioned LRU cache.
///
/// The map itself is a `DashMap` (sharded locking, O(1) ops per spec §5's
/// "guarded by a single lock held only for O(1) map ops" — here sharded
/// across buckets rather than a single mutex, which is the idiomatic
/// concurrent-map equivalent). Recency is tracked with a monotonic logical
/// clock rather than wall time, so eviction order is reproducible in tests.
pub struct L1Cache {
    entries: DashMap<CacheKey, Entry>,
    project_counts: DashMap<String, usize>,
    project_bytes: DashMap<String, usize>,
    global_bytes: AtomicUsize,
    clock: AtomicU64,
    quota: QuotaConfig,
}

impl L1Cache {
    pub fn new(quota: QuotaConfig) -> Self {
        Self {
            entries: DashMap::new(),
            project_counts: DashMap::new(),
            project_bytes: DashMap::new(),
            global_bytes: AtomicUsize::new(0),
            clock: AtomicU64::new(0),
            quota,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<u8>>> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        self.entries.get_mut(key).map(|mut e| {
            e.last_access = tick;
            Arc::clone(&e.value)
        })
    }

    pub fn put(&self, key: CacheKey, value: Arc<Vec<u8>>, project_id: &str) {
        let bytes = value.len();
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);

        if let Some(prev) = self.entries.insert(
            key.clone(),
            Entry {
                value,
                project_id: project_id.to_string(),
                last_access: tick,
            },
        ) {
            self.adjust(&prev.project_id, -(prev.value.len() as isize));
            if let Some(mut c) = self.project_counts.get_mut(&prev.project_id) {
                *c = c.saturating_sub(1);
            }
        }
        self.adjust(project_id, bytes as isize);
        *self.project_counts.entry(project_id.to_string()).or_insert(0) += 1;

        self.enforce_project_soft_limit(project_id);
        self.enforce_global_hard_limit();
    }

    fn adjust(&self, project_id: &str, delta: isize) {
        let mut entry = self.project_bytes.entry(project_id.to_string()).or_insert(0);
        *entry = (*entry as isize + delta).max(0) as usize;
        let global = self.global_bytes.load(Ordering::Relaxed) as isize + delta;
        self.global_bytes.store(global.max(0) as usize, Ordering::Relaxed);
    }

    /// Noisy-neighbor prevention: evict the inserting project's own LRU
    /// entries first when that project exceeds its soft limit.
    fn enforce_project_soft_limit(&self, project_id: &str) {
        loop {
            let count = self
                .project_counts
                .get(project_id)
                .map(|c| *c)
                .unwrap_or(0);
            let bytes = self.project_bytes.get(project_id).map(|b| *b).unwrap_or(0);
            if count <= self.quota.project_soft_max_entries
                && bytes <= self.quota.project_soft_max_bytes
            {
                break;
            }
            if !self.evict_lru_for_project(project_id) {
                break;
            }
        }
    }

    fn enforce_global_hard_limit(&self) {
        loop {
            let entries = self.entries.len();
            let bytes = self.global_bytes.load(Ordering::Relaxed);
            if entries <= self.quota.global_max_entries && bytes <= self.quota.global_max_bytes {
                break;
            }
            if !self.evict_lru_global() {
                break;
            }
        }
    }

    fn evict_lru_for_project(&self, project_id: &str) -> bool {
        let victim = self
            .entries
            .iter()
            .filter(|e| e.project_id == project_id)
            .min_by_key(|e| e.last_access)
            .map(|e| e.key().clone());
        self.evict(victim)
    }

    fn evict_lru_global(&self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| e.last_access)
            .map(|e| e.key().clone());
        self.evict(victim)
    }

    fn evict(&self, victim: Option<CacheKey>) -> bool {
        match victim {
            Some(key) => {
                if let Some((_, entry)) = self.entries.remove(&key) {
                    self.adjust(&entry.project_id, -(entry.value.len() as isize));
                    if let Some(mut c) = self.project_counts.get_mut(&entry.project_id) {
                        *c = c.saturating_sub(1);
                    }
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.project_counts.clear();
        self.project_bytes.clear();
        self.global_bytes.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> CacheKey {
        CacheKey::new(format!("f{n}.py"), format!("hash{n}"), 1)
    }

    #[test]
    fn hit_after_put() {
        let cache = L1Cache::new(QuotaConfig::default());
        cache.put(key(1), Arc::new(vec![1, 2, 3]), "proj-a");
        assert_eq!(cache.get(&key(1)).as_deref(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn project_soft_limit_evicts_own_entries_first() {
        let quota = QuotaConfig {
            global_max_entries: 100,
            global_max_bytes: 10_000,
            project_soft_max_entries: 2,
            project_soft_max_bytes: 10_000,
        };
        let cache = L1Cache::new(quota);
        cache.put(key(1), Arc::new(vec![0; 4]), "noisy");
        cache.put(key(2), Arc::new(vec![0; 4]), "noisy");
        cache.put(key(3), Arc::new(vec![0; 4]), "quiet");
        // inserting a third entry for "noisy" must evict noisy's own LRU,
        // never the unrelated "quiet" project's entry.
        cache.put(key(4), Arc::new(vec![0; 4]), "noisy");
        assert!(cache.get(&key(3)).is_some());
        assert!(cache.get(&key(1)).is_none());
    }
}
