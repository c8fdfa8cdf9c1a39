//! Analytical summaries derivable from the session buffer alone (§4.L):
//! no external dependencies, everything computed over in-memory state.

use std::collections::HashMap;

use super::buffer::SessionBuffer;
use super::domain::HealthReport;

pub fn health_report(buffer: &SessionBuffer) -> HealthReport {
    let rollups = buffer.rollups();
    let mut by_tier: HashMap<u8, (u64, u64)> = HashMap::new();
    let mut pattern_counts: HashMap<String, usize> = HashMap::new();
    let mut event_count = 0usize;

    for event in buffer.all_events() {
        event_count += 1;
        *pattern_counts.entry(event.rule_id.clone()).or_insert(0) += 1;
        let rollup = rollups.get(&event.rule_id).cloned().unwrap_or_default();
        let entry = by_tier.entry(event.tier).or_insert((0, 0));
        entry.0 += rollup.suppress;
        entry.1 += rollup.suppress + rollup.confirm + rollup.ignore;
    }

    let mut fp_rate_by_tier: Vec<(u8, f64)> = by_tier
        .into_iter()
        .map(|(tier, (suppressed, total))| (tier, if total == 0 { 0.0 } else { suppressed as f64 / total as f64 }))
        .collect();
    fp_rate_by_tier.sort_by_key(|(tier, _)| *tier);

    let mut top_patterns: Vec<(String, usize)> = pattern_counts.into_iter().collect();
    top_patterns.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_patterns.truncate(10);

    HealthReport { sessions: buffer.session_count(), events: event_count, fp_rate_by_tier, top_patterns }
}
