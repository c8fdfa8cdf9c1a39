//! File watcher domain types (§4.J), grounded in the teacher's `ports`
//! module shape but widened to the spec's batch/debounce semantics.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl FileChangeEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileChangeEvent::Created(p) | FileChangeEvent::Modified(p) | FileChangeEvent::Deleted(p) => p,
        }
    }
}

/// A flushed batch (§4.J: "emit a ChangeSet to a supplied callback").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: HashSet<PathBuf>,
    pub modified: HashSet<PathBuf>,
    pub deleted: HashSet<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub root_path: PathBuf,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub recursive: bool,
    /// Resets on every new event; on expiry the current batch flushes.
    pub debounce_duration: Duration,
    /// Starts on the first event of a batch; forces a flush on expiry
    /// regardless of ongoing debounce resets.
    pub max_batch_window: Duration,
    /// Bounded event queue capacity; overflow drops the oldest unhandled
    /// event and increments a loss counter rather than blocking the
    /// notify callback thread.
    pub queue_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            extensions: vec!["py".to_string(), "ts".to_string(), "tsx".to_string()],
            ignore_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/target/**".to_string(),
                "**/__pycache__/**".to_string(),
            ],
            recursive: true,
            debounce_duration: Duration::from_millis(300),
            max_batch_window: Duration::from_secs(5),
            queue_capacity: 4096,
        }
    }
}
