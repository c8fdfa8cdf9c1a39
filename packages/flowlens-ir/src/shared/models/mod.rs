//! Shared IR models: the vocabulary every feature module builds on.

pub mod edge;
pub mod node;
pub mod span;

pub use edge::{base_cost, Edge, EdgeKind, EdgeMetadata};
pub use node::{Node, NodeBuilder, NodeId, NodeKind};
pub use span::{Location, Span};

pub use serde_json::Value;
