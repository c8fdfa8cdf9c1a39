//! IR edge model (spec §3.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::node::NodeId;
use super::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Contains,
    Calls,
    Reads,
    Writes,
    Inherits,
    Implements,
    Imports,
    ReferencesType,
    ReferencesSymbol,
    Decorates,
    Instantiates,
    Documents,
    CfgNext,
    CfgBranch,
    CfgLoop,
    CfgHandler,
    Dfg,
    RouteHandler,
    MiddlewareNext,
    /// Interprocedural edge from a call-site argument to the callee parameter
    /// it binds to (§4.H). Carries `caller_context`/`callee_context` in attrs.
    ArgToParam,
    /// Interprocedural edge from a callee's return expression back to the
    /// call-site expression that receives it (§4.H).
    ReturnToCallsite,
}

pub type EdgeMetadata = HashMap<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub span: Option<Span>,
    #[serde(default)]
    pub attrs: EdgeMetadata,
}

impl Edge {
    pub fn new(kind: EdgeKind, source_id: impl Into<NodeId>, target_id: impl Into<NodeId>) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            target_id: target_id.into(),
            span: None,
            attrs: HashMap::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// A synthetic id for a cross-file reference whose declaring file has not
    /// (yet, or ever) been resolved — invariant 2 in spec §3.2.
    pub fn external_id(hint: &str) -> NodeId {
        format!("External:{}", hint)
    }

    pub fn is_external_target(&self) -> bool {
        self.target_id.starts_with("External:")
    }
}

/// Base traversal costs for the query executor's cost-aware search (§4.I).
pub fn base_cost(kind: EdgeKind) -> f64 {
    match kind {
        EdgeKind::Calls => 1.0,
        EdgeKind::Contains => 0.5,
        EdgeKind::Imports => 2.0,
        EdgeKind::CfgNext | EdgeKind::CfgBranch | EdgeKind::CfgLoop | EdgeKind::CfgHandler => 4.0,
        EdgeKind::Dfg | EdgeKind::Reads | EdgeKind::Writes => 3.0,
        EdgeKind::Inherits | EdgeKind::Implements => 1.5,
        _ => 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_edge_is_detected() {
        let e = Edge::new(EdgeKind::Calls, "local-id", Edge::external_id("pkg.other.func"));
        assert!(e.is_external_target());
    }

    #[test]
    fn base_costs_match_spec() {
        assert_eq!(base_cost(EdgeKind::Calls), 1.0);
        assert_eq!(base_cost(EdgeKind::Contains), 0.5);
        assert_eq!(base_cost(EdgeKind::Imports), 2.0);
        assert_eq!(base_cost(EdgeKind::CfgBranch), 4.0);
        assert_eq!(base_cost(EdgeKind::Dfg), 3.0);
        assert_eq!(base_cost(EdgeKind::Inherits), 1.5);
    }
}
