//! Pattern subsumption (§4.G): "A subsumes B if every string matching B
//! also matches A". Decided structurally when both sides are simple
//! prefix/suffix wildcards, verified by sample generation otherwise.
//! Resolution (Open Question 2, §9): the narrower rule survives; the
//! broader rule is discarded, with its id recorded in the survivor's
//! `subsumed_by` audit trail.

use super::compiled::CompiledRule;
use super::pattern::glob_matches;

/// Plugs a handful of representative fillers into `pattern`'s wildcard to
/// produce literal samples, used when neither side is a pure literal.
fn sample(pattern: &str) -> Vec<String> {
    const FILLERS: [&str; 3] = ["", "x", "abc123"];
    match pattern.split_once('*') {
        None => vec![pattern.to_string()],
        Some((prefix, suffix)) => FILLERS.iter().map(|f| format!("{prefix}{f}{suffix}")).collect(),
    }
}

/// True if every string matching `b` also matches `a`.
fn subsumes(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    if !a.contains('*') {
        return false; // a literal cannot subsume anything but itself
    }
    sample(b).iter().all(|s| glob_matches(a, s))
}

/// Deduplicates `rules` in catalog order, restricting subsumption checks to
/// rules sharing `(base_type, action)` — a sink pattern never subsumes a
/// source pattern even if the target strings happen to overlap.
pub fn dedupe(rules: Vec<CompiledRule>) -> Vec<CompiledRule> {
    let mut kept: Vec<CompiledRule> = Vec::with_capacity(rules.len());

    'next_rule: for mut candidate in rules {
        let mut i = 0;
        while i < kept.len() {
            let existing = &kept[i];
            let same_group =
                existing.pattern.base_type == candidate.pattern.base_type && existing.pattern.action == candidate.pattern.action;
            if !same_group {
                i += 1;
                continue;
            }

            if subsumes(&existing.pattern.target, &candidate.pattern.target) {
                // existing is broader; candidate is narrower and survives.
                candidate.subsumed_by = Some(existing.id.clone());
                kept.remove(i);
                kept.push(candidate);
                continue 'next_rule;
            }
            if subsumes(&candidate.pattern.target, &existing.pattern.target) {
                // candidate is broader; existing already covers it, discard candidate
                // but record the broader candidate's id on the narrower survivor.
                kept[i].subsumed_by = Some(candidate.id.clone());
                continue 'next_rule;
            }
            i += 1;
        }
        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rules::atom::AtomKind;
    use crate::features::rules::pattern::parse_pattern;

    fn rule(id: &str, pattern: &str) -> CompiledRule {
        CompiledRule {
            id: id.to_string(),
            kind: AtomKind::Sink,
            pattern: parse_pattern(pattern).unwrap(),
            arg_constraints: Vec::new(),
            severity: "high".to_string(),
            cwe: None,
            language: None,
            framework: None,
            tier: 1,
            subsumed_by: None,
        }
    }

    #[test]
    fn narrower_rule_survives_broader_one() {
        let kept = dedupe(vec![rule("broad", "os:call:sys*"), rule("narrow", "os:call:system")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "narrow");
        assert_eq!(kept[0].subsumed_by.as_deref(), Some("broad"));
    }

    #[test]
    fn order_independent_narrower_first_still_survives() {
        let kept = dedupe(vec![rule("narrow", "os:call:system"), rule("broad", "os:call:sys*")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "narrow");
    }

    #[test]
    fn unrelated_patterns_both_survive() {
        let kept = dedupe(vec![rule("a", "os:call:system"), rule("b", "subprocess:call:run")]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn different_action_groups_never_subsume_each_other() {
        let kept = dedupe(vec![rule("a", "os:call:*"), rule("b", "os:read:system")]);
        assert_eq!(kept.len(), 2);
    }
}
