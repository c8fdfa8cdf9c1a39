//! Component L: match-event telemetry and feedback audit. No external
//! dependencies — everything here is in-memory bookkeeping.

mod analytics;
mod buffer;
mod domain;

pub use analytics::health_report;
pub use buffer::SessionBuffer;
pub use domain::{Feedback, FeedbackAction, HealthReport, MatchAction, MatchEvent, RuleRollup};
