//! The traversal graph the executor runs over: every node/edge across a
//! resolved set of IRDocuments, flattened into an adjacency list with
//! per-edge cost (§4.I edge-cost model).

use std::collections::{HashMap, HashSet};

use crate::features::ir_generation::IRDocument;
use crate::shared::models::{base_cost, Edge, EdgeKind, NodeId};

use super::plan::QueryIntent;

const TEST_PATH_MULTIPLIER: f64 = 5.0;
const MOCK_PATH_MULTIPLIER: f64 = 8.0;
const CROSS_MODULE_MULTIPLIER: f64 = 1.5;
const EXTERNAL_MODULE_MULTIPLIER: f64 = 3.0;

pub struct TraversalEdge {
    pub target: NodeId,
    pub kind: EdgeKind,
    base_cost: f64,
    is_external: bool,
    is_cross_module: bool,
    is_test_path: bool,
    is_mock_path: bool,
    /// The call-site context an `ArgToParam`/`ReturnToCallsite` edge was
    /// tagged with (§4.H k=1 context sensitivity); `None` for every other
    /// edge kind.
    pub context: Option<String>,
}

impl TraversalEdge {
    /// Rescales the base edge-cost multipliers for the plan's query intent
    /// (§4.I: "a per-intent table rescales these"). `Symbol` queries (name
    /// lookup, call-chain, containment) care less about crossing a module
    /// boundary than `Flow` queries (dataflow/taint-proof) do, since a
    /// symbol reference is just as real across files; `Concept` queries
    /// (broader semantic/doc search) additionally discount leaving into
    /// external/vendored code, since conceptually-related code often lives
    /// there on purpose.
    pub fn cost_for_intent(&self, intent: QueryIntent) -> f64 {
        let mut cost = self.base_cost;
        let (cross_module, external_module) = match intent {
            QueryIntent::Flow => (CROSS_MODULE_MULTIPLIER, EXTERNAL_MODULE_MULTIPLIER),
            QueryIntent::Symbol => (CROSS_MODULE_MULTIPLIER * 0.5, EXTERNAL_MODULE_MULTIPLIER),
            QueryIntent::Concept => (CROSS_MODULE_MULTIPLIER * 0.5, EXTERNAL_MODULE_MULTIPLIER * 0.5),
        };
        if self.is_external {
            cost *= external_module;
        } else if self.is_cross_module {
            cost *= cross_module;
        }
        if self.is_test_path {
            cost *= TEST_PATH_MULTIPLIER;
        }
        if self.is_mock_path {
            cost *= MOCK_PATH_MULTIPLIER;
        }
        cost
    }
}

#[derive(Default)]
pub struct TraversalGraph {
    pub forward: HashMap<NodeId, Vec<TraversalEdge>>,
    pub backward: HashMap<NodeId, Vec<TraversalEdge>>,
    pub file_of: HashMap<NodeId, String>,
}

impl TraversalGraph {
    pub fn build(documents: &[IRDocument]) -> Self {
        let mut graph = Self::default();
        for doc in documents {
            for node in &doc.nodes {
                graph.file_of.insert(node.id.clone(), node.file_path.clone());
            }
        }
        for doc in documents {
            for edge in &doc.edges {
                let shape = EdgeShape::of(edge, &graph.file_of);
                let context = match edge.kind {
                    EdgeKind::ArgToParam | EdgeKind::ReturnToCallsite => {
                        edge.attrs.get("callee_context").and_then(|v| v.as_str()).map(str::to_string)
                    }
                    _ => None,
                };
                graph.forward.entry(edge.source_id.clone()).or_default().push(TraversalEdge {
                    target: edge.target_id.clone(),
                    kind: edge.kind,
                    base_cost: shape.base_cost,
                    is_external: shape.is_external,
                    is_cross_module: shape.is_cross_module,
                    is_test_path: shape.is_test_path,
                    is_mock_path: shape.is_mock_path,
                    context: context.clone(),
                });
                graph.backward.entry(edge.target_id.clone()).or_default().push(TraversalEdge {
                    target: edge.source_id.clone(),
                    kind: edge.kind,
                    base_cost: shape.base_cost,
                    is_external: shape.is_external,
                    is_cross_module: shape.is_cross_module,
                    is_test_path: shape.is_test_path,
                    is_mock_path: shape.is_mock_path,
                    context,
                });
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.file_of.len()
    }
}

struct EdgeShape {
    base_cost: f64,
    is_external: bool,
    is_cross_module: bool,
    is_test_path: bool,
    is_mock_path: bool,
}

impl EdgeShape {
    fn of(edge: &Edge, file_of: &HashMap<NodeId, String>) -> Self {
        let is_external = edge.is_external_target();
        let is_cross_module = !is_external
            && match (file_of.get(&edge.source_id), file_of.get(&edge.target_id)) {
                (Some(source_file), Some(target_file)) => source_file != target_file,
                _ => false,
            };
        Self {
            base_cost: base_cost(edge.kind),
            is_external,
            is_cross_module,
            is_test_path: is_test_path(&edge.source_id, file_of) || is_test_path(&edge.target_id, file_of),
            is_mock_path: is_mock_path(&edge.source_id, file_of) || is_mock_path(&edge.target_id, file_of),
        }
    }
}

fn is_test_path(node: &NodeId, file_of: &HashMap<NodeId, String>) -> bool {
    file_of.get(node).is_some_and(|f| f.contains("test"))
}

fn is_mock_path(node: &NodeId, file_of: &HashMap<NodeId, String>) -> bool {
    file_of.get(node).is_some_and(|f| f.contains("mock"))
}

pub fn default_forbidden() -> HashSet<NodeId> {
    HashSet::new()
}
