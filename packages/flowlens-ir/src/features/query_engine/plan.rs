//! `QueryPlan`, the canonical description of an analytical query (§3.1, §6).
//! No string-DSL path exists — callers construct this directly.

use serde::{Deserialize, Serialize};

use crate::shared::models::{EdgeKind, NodeId};
use crate::shared::content_hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryKind {
    Slice,
    Dataflow,
    TaintProof,
    CallChain,
    DataDependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceDirection {
    Forward,
    Backward,
}

/// Rescales the edge-cost multipliers (§4.I: "a per-intent table rescales
/// these"). `Flow` is the default and keeps the tuned base weights, since
/// dataflow/taint-proof queries are exactly what those weights were tuned
/// against; `Symbol` (name/reference/containment lookups) and `Concept`
/// (broader semantic search) discount the module-boundary penalties that
/// matter less to those intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    #[default]
    Flow,
    Symbol,
    Concept,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Budget {
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_paths: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self { max_depth: 64, max_nodes: 10_000, max_paths: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStrategy {
    CostAwareDijkstra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPlan {
    pub kind: QueryKind,
    pub patterns: Vec<NodeId>,
    pub budget: Budget,
    pub file_scope: Option<String>,
    pub function_scope: Option<String>,
    pub edge_types: Option<Vec<EdgeKind>>,
    pub slice_direction: Option<SliceDirection>,
    pub policy_id: Option<String>,
    pub traversal_strategy: TraversalStrategy,
    pub intent: QueryIntent,
    pub metadata: serde_json::Value,
}

impl QueryPlan {
    pub fn new(kind: QueryKind, patterns: Vec<NodeId>) -> Self {
        Self {
            kind,
            patterns,
            budget: Budget::default(),
            file_scope: None,
            function_scope: None,
            edge_types: None,
            slice_direction: None,
            policy_id: None,
            traversal_strategy: TraversalStrategy::CostAwareDijkstra,
            intent: QueryIntent::default(),
            metadata: serde_json::Value::Null,
        }
    }

    /// A stable hash over the plan's fields, used as (part of) the cache
    /// key (§4.I). Deterministic across runs: field order here is fixed,
    /// never derived from a `HashMap` iteration order.
    pub fn hash(&self) -> String {
        let canonical = format!(
            "{:?}|{:?}|{}|{}|{}|{:?}|{:?}|{:?}|{:?}|{:?}",
            self.kind,
            self.patterns,
            self.budget.max_depth,
            self.budget.max_nodes,
            self.budget.max_paths,
            self.file_scope,
            self.function_scope,
            self.slice_direction,
            self.policy_id,
            self.intent,
        );
        content_hash(canonical.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_identical_plans() {
        let a = QueryPlan::new(QueryKind::Slice, vec!["n1".to_string()]);
        let b = QueryPlan::new(QueryKind::Slice, vec!["n1".to_string()]);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn hash_differs_on_budget_change() {
        let mut a = QueryPlan::new(QueryKind::Slice, vec!["n1".to_string()]);
        let b = a.clone();
        a.budget.max_depth = 5;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn hash_differs_on_intent_change() {
        let mut a = QueryPlan::new(QueryKind::Slice, vec!["n1".to_string()]);
        let b = a.clone();
        a.intent = QueryIntent::Concept;
        assert_ne!(a.hash(), b.hash());
    }
}
