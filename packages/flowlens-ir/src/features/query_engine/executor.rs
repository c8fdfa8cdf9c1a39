//! Cost-aware Dijkstra executor (§4.I): translates a `QueryKind` into a
//! traversal shape over the `TraversalGraph` and enforces the plan's budget.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::shared::models::{EdgeKind, NodeId};

use super::error::QueryError;
use super::graph::TraversalGraph;
use super::plan::{QueryIntent, QueryKind, QueryPlan, SliceDirection};
use super::result::{ExecutionMetadata, ExecutionResult, ExecutionStatus, PathResult, PathSet};

/// Plan-result cache. Keyed by `(snapshot_id, plan_hash)`, or additionally
/// by `ruleset_hash` for `TAINT_PROOF` plans whose result depends on which
/// rule catalog produced the source/sink/sanitizer anchors (resolved open
/// question: taint-proof results are invalidated by a ruleset change even
/// when the snapshot and plan are unchanged).
#[derive(Default)]
pub struct ExecutionCache {
    entries: HashMap<String, ExecutionResult>,
}

impl ExecutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(snapshot_id: &str, plan: &QueryPlan, ruleset_hash: Option<&str>) -> String {
        match (plan.kind, ruleset_hash) {
            (QueryKind::TaintProof, Some(rh)) => format!("{snapshot_id}:{}:{rh}", plan.hash()),
            _ => format!("{snapshot_id}:{}", plan.hash()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ExecutionResult> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: String, result: ExecutionResult) {
        self.entries.insert(key, result);
    }
}

/// A traversal state: which node, and which call site's context we are
/// currently "inside" (§4.H k=1 context sensitivity). `None` means we are
/// not inside any interprocedural call at all, or have already returned
/// from one.
type StateKey = (NodeId, Option<String>);

#[derive(Debug)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
    context: Option<String>,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the lowest cost first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

struct Budgeted {
    max_depth: usize,
    max_nodes: usize,
    max_paths: usize,
    nodes_visited: usize,
    truncated_reason: Option<String>,
}

/// Executes `plan` over `graph`. `forbidden` blocks traversal through nodes
/// such as sanitizer call sites for a `TAINT_PROOF` plan, except when they
/// are themselves the anchor.
pub fn execute(plan: &QueryPlan, graph: &TraversalGraph, forbidden: &HashSet<NodeId>) -> Result<ExecutionResult, QueryError> {
    let Some(anchor) = plan.patterns.first() else {
        return Err(QueryError::EmptyPattern);
    };

    let mut budget = Budgeted {
        max_depth: plan.budget.max_depth,
        max_nodes: plan.budget.max_nodes,
        max_paths: plan.budget.max_paths,
        nodes_visited: 0,
        truncated_reason: None,
    };

    let (edge_types, reverse): (Option<&[EdgeKind]>, bool) = match plan.kind {
        QueryKind::Slice => (
            plan.edge_types.as_deref(),
            matches!(plan.slice_direction, Some(SliceDirection::Backward)),
        ),
        QueryKind::CallChain => (Some(&[EdgeKind::Calls]), false),
        QueryKind::DataDependency => (Some(&[EdgeKind::Reads, EdgeKind::Writes, EdgeKind::Dfg]), false),
        QueryKind::Dataflow | QueryKind::TaintProof => (
            Some(&[EdgeKind::Dfg, EdgeKind::ArgToParam, EdgeKind::ReturnToCallsite]),
            false,
        ),
    };

    let target = match plan.kind {
        QueryKind::Dataflow | QueryKind::TaintProof => {
            if plan.patterns.len() < 2 {
                return Err(QueryError::ArityMismatch(2, plan.patterns.len()));
            }
            Some(plan.patterns[1].clone())
        }
        QueryKind::CallChain if plan.patterns.len() >= 2 => Some(plan.patterns[1].clone()),
        _ => None,
    };

    let paths = dijkstra(graph, anchor, target.as_ref(), edge_types, reverse, forbidden, plan.intent, &mut budget);

    let status = if budget.truncated_reason.is_some() {
        ExecutionStatus::Partial
    } else {
        ExecutionStatus::Success
    };

    Ok(ExecutionResult {
        status,
        metadata: ExecutionMetadata {
            nodes_visited: budget.nodes_visited,
            paths_found: paths.len(),
            truncated_reason: budget.truncated_reason.clone(),
        },
        budget_used: budget.nodes_visited,
        cursor: None,
        data: PathSet { paths },
    })
}

/// Single-source cost-aware shortest-path search. When `target` is `Some`,
/// stops at the first pop of that node and returns just that one path.
/// When `None`, accumulates the shortest path to every node popped, up to
/// `max_paths`, in increasing-cost order (slice / call-chain / data-dependency
/// mode).
#[allow(clippy::too_many_arguments)]
fn dijkstra(
    graph: &TraversalGraph,
    start: &NodeId,
    target: Option<&NodeId>,
    edge_types: Option<&[EdgeKind]>,
    reverse: bool,
    forbidden: &HashSet<NodeId>,
    intent: QueryIntent,
    budget: &mut Budgeted,
) -> Vec<PathResult> {
    let adjacency = if reverse { &graph.backward } else { &graph.forward };

    let mut dist: HashMap<StateKey, f64> = HashMap::new();
    let mut prev: HashMap<StateKey, (StateKey, EdgeKind)> = HashMap::new();
    let mut depth: HashMap<StateKey, usize> = HashMap::new();
    let mut settled: HashSet<StateKey> = HashSet::new();
    let mut heap = BinaryHeap::new();

    let start_key: StateKey = (start.clone(), None);
    dist.insert(start_key.clone(), 0.0);
    depth.insert(start_key.clone(), 0);
    heap.push(HeapEntry { cost: 0.0, node: start.clone(), context: None });

    let mut results = Vec::new();

    while let Some(HeapEntry { cost, node, context }) = heap.pop() {
        let key: StateKey = (node.clone(), context.clone());
        if settled.contains(&key) {
            continue;
        }
        if budget.nodes_visited >= budget.max_nodes {
            budget.truncated_reason = Some("budget_exceeded".to_string());
            break;
        }
        settled.insert(key.clone());
        budget.nodes_visited += 1;

        if node != *start {
            if let Some(t) = target {
                if node == *t {
                    results.push(build_path(&key, cost, &prev, start));
                    return results;
                }
            } else {
                results.push(build_path(&key, cost, &prev, start));
                if results.len() >= budget.max_paths {
                    budget.truncated_reason = Some("budget_exceeded".to_string());
                    break;
                }
            }
        }

        let node_depth = *depth.get(&key).unwrap_or(&0);
        if node_depth >= budget.max_depth {
            continue;
        }

        let Some(edges) = adjacency.get(&node) else { continue };
        for edge in edges {
            if let Some(types) = edge_types {
                if !types.contains(&edge.kind) {
                    continue;
                }
            }
            if forbidden.contains(&edge.target) && Some(&edge.target) != target {
                continue;
            }

            // k=1 context sensitivity (§4.H): entering a callee via
            // `ArgToParam` sets the current context to that call site;
            // leaving it via `ReturnToCallsite` is only valid for the call
            // site that set it. Every other edge kind passes the current
            // context through unchanged.
            let next_context = match edge.kind {
                EdgeKind::ArgToParam => Some(edge.context.clone().unwrap_or_default()),
                EdgeKind::ReturnToCallsite => match (&context, &edge.context) {
                    (Some(current), Some(edge_ctx)) if current == edge_ctx => None,
                    _ => continue,
                },
                _ => context.clone(),
            };

            let next_key: StateKey = (edge.target.clone(), next_context.clone());
            let next_cost = cost + edge.cost_for_intent(intent);
            let better = dist.get(&next_key).map(|d| next_cost < *d).unwrap_or(true);
            if better {
                dist.insert(next_key.clone(), next_cost);
                prev.insert(next_key.clone(), (key.clone(), edge.kind));
                depth.insert(next_key.clone(), node_depth + 1);
                heap.push(HeapEntry { cost: next_cost, node: edge.target.clone(), context: next_context });
            }
        }
    }

    results
}

fn build_path(end: &StateKey, cost: f64, prev: &HashMap<StateKey, (StateKey, EdgeKind)>, start: &NodeId) -> PathResult {
    let mut nodes = vec![end.0.clone()];
    let mut edge_kinds = Vec::new();
    let mut current = end.clone();
    while let Some((pred, kind)) = prev.get(&current) {
        nodes.push(pred.0.clone());
        edge_kinds.push(*kind);
        current = pred.clone();
        if &current.0 == start {
            break;
        }
    }
    nodes.reverse();
    edge_kinds.reverse();
    let length = edge_kinds.len();
    let confidence = 1.0 / (1.0 + cost / (length.max(1) as f64));
    PathResult {
        nodes,
        edge_kinds,
        length,
        confidence,
        metadata: serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::{IRDocument, IRDocumentTag};
    use crate::shared::models::{Edge, EdgeKind as EK, Node, NodeKind, Span};

    fn node(id: &str, file: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: NodeKind::Function,
            fqn: id.to_string(),
            name: id.to_string(),
            file_path: file.to_string(),
            span: Span::zero(),
            parent_id: None,
            attrs: Default::default(),
        }
    }

    fn doc_with(nodes: Vec<Node>, edges: Vec<Edge>) -> IRDocument {
        let tag = IRDocumentTag {
            repo_id: "repo".to_string(),
            snapshot_id: "snap".to_string(),
            content_hash: "hash".to_string(),
            parser_version: 1,
        };
        let mut doc = IRDocument::new("a.py".to_string(), tag);
        doc.nodes = nodes;
        doc.edges = edges;
        doc
    }

    #[test]
    fn call_chain_finds_direct_call() {
        let doc = doc_with(
            vec![node("a", "a.py"), node("b", "a.py"), node("c", "a.py")],
            vec![Edge::new(EK::Calls, "a", "b"), Edge::new(EK::Calls, "b", "c")],
        );
        let graph = TraversalGraph::build(&[doc]);
        let mut plan = QueryPlan::new(QueryKind::CallChain, vec!["a".to_string(), "c".to_string()]);
        plan.budget.max_nodes = 100;
        let result = execute(&plan, &graph, &HashSet::new()).unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
        assert_eq!(result.data.paths.len(), 1);
        assert_eq!(result.data.paths[0].nodes, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn taint_proof_path_is_blocked_by_sanitizer() {
        let doc = doc_with(
            vec![node("src", "a.py"), node("san", "a.py"), node("sink", "a.py")],
            vec![Edge::new(EK::Dfg, "src", "san"), Edge::new(EK::Dfg, "san", "sink")],
        );
        let graph = TraversalGraph::build(&[doc]);
        let plan = QueryPlan::new(QueryKind::TaintProof, vec!["src".to_string(), "sink".to_string()]);
        let mut forbidden = HashSet::new();
        forbidden.insert("san".to_string());
        let result = execute(&plan, &graph, &forbidden).unwrap();
        assert_eq!(result.data.paths.len(), 0);
    }

    #[test]
    fn slice_respects_max_paths_budget() {
        let doc = doc_with(
            vec![node("root", "a.py"), node("x", "a.py"), node("y", "a.py")],
            vec![Edge::new(EK::Contains, "root", "x"), Edge::new(EK::Contains, "root", "y")],
        );
        let graph = TraversalGraph::build(&[doc]);
        let mut plan = QueryPlan::new(QueryKind::Slice, vec!["root".to_string()]);
        plan.budget.max_paths = 1;
        let result = execute(&plan, &graph, &HashSet::new()).unwrap();
        assert_eq!(result.status, ExecutionStatus::Partial);
        assert_eq!(result.data.paths.len(), 1);
    }

    #[test]
    fn dataflow_without_two_anchors_is_arity_mismatch() {
        let graph = TraversalGraph::build(&[]);
        let plan = QueryPlan::new(QueryKind::Dataflow, vec!["only-one".to_string()]);
        let err = execute(&plan, &graph, &HashSet::new()).unwrap_err();
        assert!(matches!(err, QueryError::ArityMismatch(2, 1)));
    }

    #[test]
    fn max_nodes_budget_is_never_exceeded_by_one() {
        let doc = doc_with(
            vec![node("root", "a.py"), node("x", "a.py"), node("y", "a.py"), node("z", "a.py")],
            vec![
                Edge::new(EK::Contains, "root", "x"),
                Edge::new(EK::Contains, "x", "y"),
                Edge::new(EK::Contains, "y", "z"),
            ],
        );
        let graph = TraversalGraph::build(&[doc]);
        let mut plan = QueryPlan::new(QueryKind::Slice, vec!["root".to_string()]);
        plan.budget.max_nodes = 2;
        plan.budget.max_paths = 100;
        let result = execute(&plan, &graph, &HashSet::new()).unwrap();
        assert_eq!(result.status, ExecutionStatus::Partial);
        assert!(result.metadata.nodes_visited <= 2);
    }

    fn arg_to_param(caller: &str, param: &str, context: &str) -> Edge {
        Edge::new(EK::ArgToParam, caller, param)
            .with_attr("caller_context", context)
            .with_attr("callee_context", context)
    }

    fn return_to_callsite(callee: &str, caller: &str, context: &str) -> Edge {
        Edge::new(EK::ReturnToCallsite, callee, caller)
            .with_attr("caller_context", context)
            .with_attr("callee_context", context)
    }

    #[test]
    fn taint_cannot_leave_a_callee_through_a_different_call_site() {
        // f() calls shared(a) at call site "ctx1" and shared(b) at call
        // site "ctx2". `a` flows into `shared`'s parameter and back out
        // through ctx1's return edge; it must not be reachable through
        // ctx2's return edge into `b`.
        let doc = doc_with(
            vec![
                node("a", "a.py"),
                node("b", "a.py"),
                node("shared.p", "a.py"),
                node("sink", "a.py"),
            ],
            vec![
                arg_to_param("a", "shared.p", "ctx1"),
                arg_to_param("b", "shared.p", "ctx2"),
                Edge::new(EK::Dfg, "shared.p", "shared.p"),
                return_to_callsite("shared.p", "a", "ctx1"),
                return_to_callsite("shared.p", "b", "ctx2"),
                Edge::new(EK::Dfg, "a", "sink"),
            ],
        );
        let graph = TraversalGraph::build(&[doc]);
        let plan = QueryPlan::new(
            QueryKind::TaintProof,
            vec!["a".to_string(), "b".to_string()],
        );
        let result = execute(&plan, &graph, &HashSet::new()).unwrap();
        // Reaching "b" from "a" would require entering shared.p under ctx1
        // and leaving under ctx2, which context-sensitivity must forbid.
        assert!(result.data.paths.is_empty());
    }
}
