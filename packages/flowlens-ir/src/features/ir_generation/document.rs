//! `IRDocument`: the per-file bundle produced by the IR generator (§3.1).

use serde::{Deserialize, Serialize};

use crate::features::flow_graph::FunctionCFG;
use crate::features::ssa::SSAFunction;
use crate::shared::models::{Edge, Node, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRDocumentTag {
    pub repo_id: String,
    pub snapshot_id: String,
    pub content_hash: String,
    pub parser_version: u32,
}

/// The per-function CFG + SSA pair (§4.D), keyed by the owning `Function`/
/// `Method` node's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionGraph {
    pub function_id: NodeId,
    pub cfg: FunctionCFG,
    pub ssa: SSAFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRDocument {
    pub file_path: String,
    pub tag: IRDocumentTag,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub function_graphs: Vec<FunctionGraph>,
    /// Diagnostics that did not prevent the document from being produced
    /// (e.g. the function whose CFG came out ill-formed and was marked
    /// partial — §4.D failure mode).
    pub diagnostics: Vec<String>,
}

impl IRDocument {
    pub fn new(file_path: impl Into<String>, tag: IRDocumentTag) -> Self {
        Self {
            file_path: file_path.into(),
            tag,
            nodes: Vec::new(),
            edges: Vec::new(),
            function_graphs: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Invariant 2 (§3.2): every edge's endpoints resolve inside this
    /// document, except synthetic `External:*` targets.
    pub fn check_edge_referential_integrity(&self) -> bool {
        self.edges.iter().all(|e| {
            let source_ok = self.node_by_id(&e.source_id).is_some();
            let target_ok = e.is_external_target() || self.node_by_id(&e.target_id).is_some();
            source_ok && target_ok
        })
    }
}
