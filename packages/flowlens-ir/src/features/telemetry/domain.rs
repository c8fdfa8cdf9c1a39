//! Telemetry & audit domain types (§4.L). No teacher module covers this;
//! it is new ambient infrastructure the atom matcher and taint engine feed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAction {
    Call,
    Read,
}

/// One atom-matcher hit, captured for later audit/analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub rule_id: String,
    pub atom_id: String,
    pub session: String,
    pub base_type: String,
    pub action: MatchAction,
    pub confidence: f64,
    pub tier: u8,
    pub reported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Suppress,
    Confirm,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub rule_id: String,
    pub session: String,
    pub action: FeedbackAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleRollup {
    pub suppress: u64,
    pub confirm: u64,
    pub ignore: u64,
}

impl RuleRollup {
    /// False-positive rate proxy: suppressions over all actionable feedback.
    pub fn fp_rate(&self) -> f64 {
        let total = self.suppress + self.confirm + self.ignore;
        if total == 0 {
            0.0
        } else {
            self.suppress as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthReport {
    pub sessions: usize,
    pub events: usize,
    pub fp_rate_by_tier: Vec<(u8, f64)>,
    pub top_patterns: Vec<(String, usize)>,
}
