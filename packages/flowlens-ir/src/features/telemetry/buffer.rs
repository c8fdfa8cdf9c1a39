//! Session match-event buffer (§4.L): sampled collection with mandatory
//! capture for tier-3/low-confidence matches, feedback rollups, and
//! count-based session pruning.

use std::collections::{HashMap, VecDeque};

use super::domain::{Feedback, FeedbackAction, MatchEvent, RuleRollup};

const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;
const MANDATORY_TIER: u8 = 3;

pub struct SessionBuffer {
    /// 1-in-N systematic sampling for events that aren't mandatorily
    /// captured; deterministic rather than random so replaying the same
    /// event stream reproduces the same buffer contents.
    sample_every: u64,
    sample_counter: u64,
    max_sessions: usize,
    session_order: VecDeque<String>,
    sessions: HashMap<String, Vec<MatchEvent>>,
    rollups: HashMap<String, RuleRollup>,
}

impl SessionBuffer {
    pub fn new(sample_every: u64, max_sessions: usize) -> Self {
        Self {
            sample_every: sample_every.max(1),
            sample_counter: 0,
            max_sessions,
            session_order: VecDeque::new(),
            sessions: HashMap::new(),
            rollups: HashMap::new(),
        }
    }

    /// Returns whether the event was captured (for the caller's own
    /// bookkeeping/tests).
    pub fn record(&mut self, event: MatchEvent) -> bool {
        let mandatory = event.tier >= MANDATORY_TIER || event.confidence < LOW_CONFIDENCE_THRESHOLD;
        let sampled = if mandatory {
            true
        } else {
            self.sample_counter += 1;
            self.sample_counter % self.sample_every == 0
        };
        if !sampled {
            return false;
        }

        if !self.sessions.contains_key(&event.session) {
            self.session_order.push_back(event.session.clone());
            self.evict_if_over_capacity();
        }
        self.sessions.entry(event.session.clone()).or_default().push(event);
        true
    }

    fn evict_if_over_capacity(&mut self) {
        while self.session_order.len() > self.max_sessions {
            if let Some(oldest) = self.session_order.pop_front() {
                self.sessions.remove(&oldest);
            }
        }
    }

    pub fn record_feedback(&mut self, feedback: Feedback) {
        let rollup = self.rollups.entry(feedback.rule_id).or_default();
        match feedback.action {
            FeedbackAction::Suppress => rollup.suppress += 1,
            FeedbackAction::Confirm => rollup.confirm += 1,
            FeedbackAction::Ignore => rollup.ignore += 1,
        }
    }

    pub fn rollup_for(&self, rule_id: &str) -> RuleRollup {
        self.rollups.get(rule_id).cloned().unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn events_in(&self, session: &str) -> &[MatchEvent] {
        self.sessions.get(session).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_events(&self) -> impl Iterator<Item = &MatchEvent> {
        self.sessions.values().flatten()
    }

    pub fn rollups(&self) -> &HashMap<String, RuleRollup> {
        &self.rollups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::telemetry::domain::MatchAction;

    fn event(session: &str, tier: u8, confidence: f64) -> MatchEvent {
        MatchEvent {
            rule_id: "r1".to_string(),
            atom_id: "a1".to_string(),
            session: session.to_string(),
            base_type: "os".to_string(),
            action: MatchAction::Call,
            confidence,
            tier,
            reported: false,
        }
    }

    #[test]
    fn tier_three_matches_are_always_captured() {
        let mut buf = SessionBuffer::new(1000, 10);
        assert!(buf.record(event("s1", 3, 0.99)));
    }

    #[test]
    fn low_confidence_matches_are_always_captured() {
        let mut buf = SessionBuffer::new(1000, 10);
        assert!(buf.record(event("s1", 1, 0.1)));
    }

    #[test]
    fn high_tier_high_confidence_is_sampled() {
        let mut buf = SessionBuffer::new(3, 10);
        let results: Vec<bool> = (0..3).map(|_| buf.record(event("s1", 1, 0.9))).collect();
        assert_eq!(results, vec![false, false, true]);
    }

    #[test]
    fn oldest_session_is_pruned_once_over_capacity() {
        let mut buf = SessionBuffer::new(1, 2);
        buf.record(event("s1", 3, 0.9));
        buf.record(event("s2", 3, 0.9));
        buf.record(event("s3", 3, 0.9));
        assert_eq!(buf.session_count(), 2);
        assert!(buf.events_in("s1").is_empty());
    }

    #[test]
    fn feedback_rolls_up_per_rule() {
        let mut buf = SessionBuffer::new(1, 10);
        buf.record_feedback(Feedback { rule_id: "r1".to_string(), session: "s1".to_string(), action: FeedbackAction::Suppress });
        buf.record_feedback(Feedback { rule_id: "r1".to_string(), session: "s1".to_string(), action: FeedbackAction::Confirm });
        let rollup = buf.rollup_for("r1");
        assert_eq!(rollup.suppress, 1);
        assert_eq!(rollup.confirm, 1);
        assert!((rollup.fp_rate() - 0.5).abs() < 1e-9);
    }
}
