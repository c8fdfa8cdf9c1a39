//! Taint-flow compiler (§4.H): turns matched sources/sinks/sanitizers into
//! a `TAINT_PROOF` query plan, executes it via the query engine, and scores
//! the resulting paths into `Vulnerability` candidates.

use std::collections::{HashMap, HashSet};

use crate::features::query_engine::{execute, QueryKind, QueryPlan, TraversalGraph};

use super::domain::{FlowPolicy, MatchedAtom, Vulnerability};
use super::error::TaintError;

/// Groups atom matches by rule kind into one policy per (source, sink) pair
/// sharing the same rule catalog weight. A single policy with multiple
/// sources/sinks is still one `TAINT_PROOF` query per source/sink pair,
/// since `QueryPlan.patterns` carries exactly the two anchors the executor
/// expects.
pub fn compile_policies(matches: &[MatchedAtom], weight: f64) -> Vec<FlowPolicy> {
    let sources: Vec<_> = matches.iter().filter(|m| matches!(m.kind, crate::features::rules::AtomKind::Source)).collect();
    let sinks: Vec<_> = matches.iter().filter(|m| matches!(m.kind, crate::features::rules::AtomKind::Sink)).collect();
    let sanitizers: Vec<String> = matches
        .iter()
        .filter(|m| matches!(m.kind, crate::features::rules::AtomKind::Sanitizer))
        .map(|m| m.node_id.clone())
        .collect();

    let mut policies = Vec::new();
    for source in &sources {
        for sink in &sinks {
            policies.push(FlowPolicy {
                id: format!("{}->{}", source.rule_id, sink.rule_id),
                sources: vec![source.node_id.clone()],
                sinks: vec![sink.node_id.clone()],
                sanitizers: sanitizers.clone(),
                weight,
            });
        }
    }
    policies
}

/// Executes every policy's flow query and returns the confirmed
/// vulnerabilities. `rule_metadata` maps a rule id to `(severity, cwe)` for
/// annotating findings.
pub fn find_vulnerabilities(
    policies: &[FlowPolicy],
    graph: &TraversalGraph,
    rule_metadata: &HashMap<String, (String, Option<String>)>,
) -> Result<Vec<Vulnerability>, TaintError> {
    let mut found = Vec::new();
    for policy in policies {
        let Some(source) = policy.sources.first() else { continue };
        let Some(sink) = policy.sinks.first() else { continue };

        let mut plan = QueryPlan::new(QueryKind::TaintProof, vec![source.clone(), sink.clone()]);
        plan.policy_id = Some(policy.id.clone());

        let forbidden: HashSet<String> = policy.sanitizers.iter().cloned().collect();
        let result = execute(&plan, graph, &forbidden)
            .map_err(|e| TaintError::PolicyExecutionFailed(policy.id.clone(), e.to_string()))?;

        for path in result.data.paths {
            let confidence = path.confidence * policy.weight;
            let (severity, cwe) = rule_metadata
                .get(sink_rule_id(&policy.id))
                .cloned()
                .unwrap_or(("medium".to_string(), None));
            found.push(Vulnerability {
                policy_id: policy.id.clone(),
                source_node: source.clone(),
                sink_node: sink.clone(),
                path,
                confidence,
                cwe,
                severity,
            });
        }
    }
    Ok(found)
}

fn sink_rule_id(policy_id: &str) -> &str {
    policy_id.split_once("->").map(|(_, sink)| sink).unwrap_or(policy_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::{IRDocument, IRDocumentTag};
    use crate::features::rules::AtomKind;
    use crate::shared::models::{Edge, EdgeKind};

    fn atom(node_id: &str, rule_id: &str, kind: AtomKind) -> MatchedAtom {
        MatchedAtom { node_id: node_id.to_string(), rule_id: rule_id.to_string(), kind, tier: 1, confidence: 0.9 }
    }

    #[test]
    fn compiles_one_policy_per_source_sink_pair() {
        let matches = vec![
            atom("src", "request-source", AtomKind::Source),
            atom("sink", "os-system-sink", AtomKind::Sink),
        ];
        let policies = compile_policies(&matches, 1.0);
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].id, "request-source->os-system-sink");
    }

    #[test]
    fn finds_vulnerability_when_path_exists() {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.edges.push(Edge::new(EdgeKind::Dfg, "src", "sink"));
        let graph = TraversalGraph::build(&[doc]);

        let policies = vec![FlowPolicy {
            id: "request-source->os-system-sink".to_string(),
            sources: vec!["src".to_string()],
            sinks: vec!["sink".to_string()],
            sanitizers: vec![],
            weight: 1.0,
        }];
        let found = find_vulnerabilities(&policies, &graph, &HashMap::new()).unwrap();
        assert_eq!(found.len(), 1);
    }
}
