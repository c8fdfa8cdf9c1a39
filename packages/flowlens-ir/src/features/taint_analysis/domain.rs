//! Taint engine domain types (§4.H).

use serde::{Deserialize, Serialize};

use crate::features::rules::AtomKind;
use crate::features::query_engine::PathResult;
use crate::shared::models::NodeId;

/// One atom-matcher hit: a call or read expression scored against a
/// compiled rule's pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedAtom {
    pub node_id: NodeId,
    pub rule_id: String,
    pub kind: AtomKind,
    pub tier: u8,
    pub confidence: f64,
}

/// A sources->>sinks policy compiled from a rule catalog, ready to be
/// executed as a `TAINT_PROOF` query plan.
#[derive(Debug, Clone)]
pub struct FlowPolicy {
    pub id: String,
    pub sources: Vec<NodeId>,
    pub sinks: Vec<NodeId>,
    pub sanitizers: Vec<NodeId>,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub policy_id: String,
    pub source_node: NodeId,
    pub sink_node: NodeId,
    pub path: PathResult,
    pub confidence: f64,
    pub cwe: Option<String>,
    pub severity: String,
}
