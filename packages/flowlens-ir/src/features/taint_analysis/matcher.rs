//! Atom matcher (§4.H): scores call/read expressions against the compiled
//! rule multi-index and keeps the top candidates per expression.

use std::collections::HashMap;

use crate::features::ir_generation::IRDocument;
use crate::features::rules::{glob_matches, ArgConstraint, PatternAction, RuleIndex};
use crate::shared::models::{Edge, EdgeKind};

use super::domain::MatchedAtom;

const ACCEPT_THRESHOLD: f64 = 0.5;
const TOP_N_PER_EXPRESSION: usize = 3;

/// Matches every call/read edge in `doc` against `index`, returning the
/// accepted candidates grouped by the expression (edge) they were found at.
pub fn match_document(doc: &IRDocument, index: &RuleIndex) -> Vec<MatchedAtom> {
    let mut matches = Vec::new();
    for edge in &doc.edges {
        let candidates = match edge.kind {
            EdgeKind::Calls => {
                let Some(callee) = edge.attrs.get("callee_name").and_then(|v| v.as_str()) else { continue };
                let base_type = edge
                    .attrs
                    .get("receiver_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                score_candidates(index.lookup_call(base_type, callee), base_type, callee, PatternAction::Call, Some(edge))
            }
            EdgeKind::Reads => {
                let Some(node) = doc.node_by_id(&edge.target_id) else { continue };
                score_candidates(
                    index.lookup_read("", &node.name),
                    "",
                    &node.name,
                    PatternAction::Read,
                    None,
                )
            }
            _ => continue,
        };

        let mut scored = candidates;
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(TOP_N_PER_EXPRESSION);
        for (rule, confidence) in scored {
            if confidence > ACCEPT_THRESHOLD {
                matches.push(MatchedAtom {
                    node_id: edge.target_id.clone(),
                    rule_id: rule.id.clone(),
                    kind: rule.kind,
                    tier: rule.tier,
                    confidence,
                });
            }
        }
    }
    matches
}

fn score_candidates<'a>(
    candidates: Vec<&'a crate::features::rules::CompiledRule>,
    base_type: &str,
    name: &str,
    action: PatternAction,
    call_edge: Option<&Edge>,
) -> Vec<(&'a crate::features::rules::CompiledRule, f64)> {
    candidates
        .into_iter()
        .filter(|r| r.pattern.action == action)
        .filter(|r| call_edge.map_or(true, |edge| satisfies_arg_constraints(&r.arg_constraints, edge)))
        .map(|rule| (rule, score(rule, base_type, name)))
        .collect()
}

/// Evaluates a rule's `arg_constraints` (§4.G `effect:`) against the
/// argument shape a walker recorded on a `Calls` edge. `Position(p)` sets
/// which argument the constraints that follow it apply to; `Tainted(true)`
/// requires that argument be syntactically dynamic (identifier,
/// interpolation, concatenation, nested call, ...) rather than a literal —
/// the proxy available at match time, before any real dataflow has run —
/// and `Tainted(false)`/`Regex`/`Constant` check the opposite or the
/// literal's text. This is what tells `cursor.execute(query, [user_id])`
/// (parameterized, arg 0 is a literal) apart from `cursor.execute(f"...")`
/// (concatenated, arg 0 is dynamic) per §8 scenario 1 vs 2.
fn satisfies_arg_constraints(constraints: &[ArgConstraint], edge: &Edge) -> bool {
    if constraints.is_empty() {
        return true;
    }
    let arg_count = edge.attrs.get("arg_count").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
    let dynamic: Vec<bool> = edge
        .attrs
        .get("arg_dynamic")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().map(|v| v.as_bool().unwrap_or(false)).collect())
        .unwrap_or_default();
    let literals: Vec<Option<String>> = edge
        .attrs
        .get("arg_literals")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    let mut position = 0usize;
    for constraint in constraints {
        match constraint {
            ArgConstraint::Position(p) => {
                position = *p;
                if position >= arg_count {
                    return false;
                }
            }
            ArgConstraint::Tainted(expected) => match dynamic.get(position) {
                Some(is_dynamic) if is_dynamic == expected => {}
                _ => return false,
            },
            ArgConstraint::Constant(value) => match literals.get(position).and_then(|l| l.as_deref()) {
                Some(text) if text == value => {}
                _ => return false,
            },
            ArgConstraint::Regex(pattern) => match (regex::Regex::new(pattern), literals.get(position).and_then(|l| l.as_deref())) {
                (Ok(re), Some(text)) if re.is_match(text) => {}
                _ => return false,
            },
        }
    }
    true
}

fn score(rule: &crate::features::rules::CompiledRule, base_type: &str, name: &str) -> f64 {
    let name_score = if rule.pattern.target == name {
        1.0
    } else if glob_matches(&rule.pattern.target, name) {
        0.7
    } else {
        0.0
    };

    let rule_base = rule.pattern.base_type.to_lowercase();
    let candidate_base = base_type.to_lowercase();
    let type_score = if rule_base.is_empty() {
        0.5
    } else if rule_base == candidate_base {
        1.0
    } else if candidate_base.contains(&rule_base) || rule_base.contains(&candidate_base) {
        0.5
    } else {
        // The multi-index's exact-call lookup ignores base_type, so a
        // mismatched receiver still surfaces as a candidate here; treat it
        // as a hard rejection rather than a weighted-down match.
        return 0.0;
    };

    let len_diff = (rule.pattern.target.len() as i64 - name.len() as i64).unsigned_abs() as f64;
    let distance_score = 1.0 / (1.0 + len_diff);

    0.6 * name_score + 0.3 * type_score + 0.1 * distance_score
}

/// Atoms that never cleared the acceptance threshold against any rule, kept
/// for debugging (§4.H: "unmatched atoms are logged for debugging").
pub fn unmatched_call_names(doc: &IRDocument, accepted: &[MatchedAtom]) -> Vec<String> {
    let accepted_targets: HashMap<&str, ()> = accepted.iter().map(|m| (m.node_id.as_str(), ())).collect();
    doc.edges
        .iter()
        .filter(|e| matches!(e.kind, EdgeKind::Calls))
        .filter(|e| !accepted_targets.contains_key(e.target_id.as_str()))
        .filter_map(|e| e.attrs.get("callee_name").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::IRDocumentTag;
    use crate::features::rules::compile_catalog;
    use crate::shared::models::{Node, NodeKind, Span};

    const CATALOG: &str = r#"
atoms:
  - id: os-system-sink
    severity: high
    kind: sink
    cwe: CWE-78
    match: ["os:call:system"]
"#;

    fn doc_with_call(base_type: &str, callee: &str) -> IRDocument {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.nodes.push(Node::new("target", NodeKind::Function, "target", callee, "a.py", Span::zero()));
        let mut edge = Edge::new(EdgeKind::Calls, "caller", "target").with_attr("callee_name", callee);
        if !base_type.is_empty() {
            edge = edge.with_attr("receiver_name", base_type);
        }
        doc.edges.push(edge);
        doc
    }

    #[test]
    fn exact_match_is_accepted_with_high_confidence() {
        let compiled = compile_catalog(CATALOG).unwrap();
        let index = RuleIndex::build(compiled);
        let doc = doc_with_call("os", "system");
        let matches = match_document(&doc, &index);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].confidence > 0.9);
    }

    #[test]
    fn wrong_receiver_is_rejected() {
        let compiled = compile_catalog(CATALOG).unwrap();
        let index = RuleIndex::build(compiled);
        let doc = doc_with_call("subprocess", "system");
        let matches = match_document(&doc, &index);
        assert!(matches.is_empty());
    }

    const SQL_SINK_CATALOG: &str = r#"
atoms:
  - id: sql-execute-sink
    severity: critical
    kind: sink
    cwe: CWE-89
    match: ["cursor:call:execute"]
    effect: "position:0,tainted:true"
"#;

    fn doc_with_execute_call(query_arg_dynamic: bool, query_literal: &str, extra_args: usize) -> IRDocument {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.nodes.push(Node::new("target", NodeKind::Function, "target", "execute", "a.py", Span::zero()));
        let mut dynamic = vec![query_arg_dynamic];
        let mut literals = vec![if query_arg_dynamic { None } else { Some(query_literal.to_string()) }];
        for _ in 0..extra_args {
            dynamic.push(true);
            literals.push(None);
        }
        let edge = Edge::new(EdgeKind::Calls, "caller", "target")
            .with_attr("callee_name", "execute")
            .with_attr("receiver_name", "cursor")
            .with_attr("arg_count", dynamic.len())
            .with_attr("arg_dynamic", dynamic)
            .with_attr("arg_literals", literals);
        doc.edges.push(edge);
        doc
    }

    #[test]
    fn parameterized_query_with_literal_sql_is_not_flagged() {
        let compiled = compile_catalog(SQL_SINK_CATALOG).unwrap();
        let index = RuleIndex::build(compiled);
        // cursor.execute("SELECT ... WHERE id=?", [user_id]) - arg 0 is a literal.
        let doc = doc_with_execute_call(false, "SELECT * FROM t WHERE id=?", 1);
        let matches = match_document(&doc, &index);
        assert!(matches.is_empty());
    }

    #[test]
    fn concatenated_query_is_flagged() {
        let compiled = compile_catalog(SQL_SINK_CATALOG).unwrap();
        let index = RuleIndex::build(compiled);
        // cursor.execute(f"SELECT ... {user_id}") - arg 0 is dynamic.
        let doc = doc_with_execute_call(true, "", 0);
        let matches = match_document(&doc, &index);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_id, "sql-execute-sink");
    }
}
