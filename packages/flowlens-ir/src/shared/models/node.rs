//! IR node model (spec §3.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::Span;

pub type NodeId = String;

/// Discriminant for the kinds of IR nodes the engine emits.
///
/// Exhaustive by design (spec §9: "dynamic dispatch is modeled with
/// explicit variant types ... an unknown variant is rejected at the
/// boundary rather than silently ignored").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Module,
    Class,
    Function,
    Method,
    Parameter,
    Variable,
    Field,
    Lambda,
    Import,
}

/// A single IR element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub fqn: String,
    pub name: String,
    pub file_path: String,
    pub span: Span,
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub attrs: HashMap<String, Value>,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        kind: NodeKind,
        fqn: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            fqn: fqn.into(),
            name: name.into(),
            file_path: file_path.into(),
            span,
            parent_id: None,
            attrs: HashMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Ergonomic builder mirroring the construction sites in `ir_generation`,
/// where attrs accumulate incrementally while walking the AST.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(
        id: impl Into<NodeId>,
        kind: NodeKind,
        fqn: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            node: Node::new(id, kind, fqn, name, file_path, span),
        }
    }

    pub fn parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.node.parent_id = Some(parent_id.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.node.attrs.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrip() {
        let n = NodeBuilder::new(
            "id1",
            NodeKind::Function,
            "pkg.mod.func",
            "func",
            "pkg/mod.py",
            Span::new(1, 0, 3, 0),
        )
        .parent("parent-id")
        .attr("signature", "func(x: int) -> int")
        .build();
        assert_eq!(n.kind, NodeKind::Function);
        assert_eq!(n.parent_id.as_deref(), Some("parent-id"));
        assert!(n.attrs.contains_key("signature"));
    }
}
