//! The debounce/coalescing state machine (§4.J), separated from the async
//! driver so its timer logic is deterministically testable without a real
//! runtime or actual sleeping.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::domain::{ChangeSet, FileChangeEvent};

pub struct Debouncer {
    debounce_duration: Duration,
    max_batch_window: Duration,
    pending: HashMap<PathBuf, FileChangeEvent>,
    debounce_deadline: Option<Instant>,
    batch_deadline: Option<Instant>,
    dropped_events: u64,
}

impl Debouncer {
    pub fn new(debounce_duration: Duration, max_batch_window: Duration) -> Self {
        Self {
            debounce_duration,
            max_batch_window,
            pending: HashMap::new(),
            debounce_deadline: None,
            batch_deadline: None,
            dropped_events: 0,
        }
    }

    /// Records one observed event, coalescing it into the in-flight batch.
    /// Per the ordering guarantee in §5 ("for a given file, the emitted
    /// change type is the most recent observed event"), a later event for
    /// the same path simply replaces the earlier one.
    pub fn record(&mut self, event: FileChangeEvent, now: Instant) {
        let path = event.path().clone();
        if self.pending.is_empty() {
            self.batch_deadline = Some(now + self.max_batch_window);
        }
        self.pending.insert(path, event);
        self.debounce_deadline = Some(now + self.debounce_duration);
    }

    /// True once either timer has expired and there is something pending.
    pub fn should_flush(&self, now: Instant) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let debounce_expired = self.debounce_deadline.is_some_and(|d| now >= d);
        let batch_expired = self.batch_deadline.is_some_and(|d| now >= d);
        debounce_expired || batch_expired
    }

    /// The instant the caller's timer should next wake at, so the async
    /// driver can `tokio::time::sleep_until` instead of busy-polling.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.batch_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    pub fn drain(&mut self) -> ChangeSet {
        let mut set = ChangeSet::default();
        for (path, event) in self.pending.drain() {
            match event {
                FileChangeEvent::Created(_) => {
                    set.added.insert(path);
                }
                FileChangeEvent::Modified(_) => {
                    set.modified.insert(path);
                }
                FileChangeEvent::Deleted(_) => {
                    set.deleted.insert(path);
                }
            }
        }
        self.debounce_deadline = None;
        self.batch_deadline = None;
        set
    }

    pub fn record_dropped(&mut self) {
        self.dropped_events += 1;
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    pub fn force_flush(&mut self) -> ChangeSet {
        self.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event_does_not_flush_before_debounce_elapses() {
        let mut d = Debouncer::new(Duration::from_millis(300), Duration::from_secs(5));
        let now = Instant::now();
        d.record(FileChangeEvent::Created(PathBuf::from("a.py")), now);
        assert!(!d.should_flush(now + Duration::from_millis(100)));
        assert!(d.should_flush(now + Duration::from_millis(301)));
    }

    #[test]
    fn new_event_resets_debounce_deadline() {
        let mut d = Debouncer::new(Duration::from_millis(300), Duration::from_secs(5));
        let now = Instant::now();
        d.record(FileChangeEvent::Created(PathBuf::from("a.py")), now);
        d.record(FileChangeEvent::Modified(PathBuf::from("a.py")), now + Duration::from_millis(200));
        assert!(!d.should_flush(now + Duration::from_millis(350)));
        assert!(d.should_flush(now + Duration::from_millis(501)));
    }

    #[test]
    fn max_batch_window_forces_flush_under_continuous_churn() {
        let mut d = Debouncer::new(Duration::from_millis(300), Duration::from_secs(1));
        let mut now = Instant::now();
        for _ in 0..10 {
            d.record(FileChangeEvent::Modified(PathBuf::from("a.py")), now);
            now += Duration::from_millis(200);
        }
        // Debounce keeps resetting (200ms < 300ms) but the 1s batch window caps it.
        assert!(d.should_flush(now));
    }

    #[test]
    fn latest_event_wins_for_same_path() {
        let mut d = Debouncer::new(Duration::from_millis(300), Duration::from_secs(5));
        let now = Instant::now();
        d.record(FileChangeEvent::Created(PathBuf::from("a.py")), now);
        d.record(FileChangeEvent::Deleted(PathBuf::from("a.py")), now);
        let set = d.drain();
        assert!(set.added.is_empty());
        assert_eq!(set.deleted.len(), 1);
    }
}
