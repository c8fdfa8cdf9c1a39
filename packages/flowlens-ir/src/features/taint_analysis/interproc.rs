//! Interprocedural edge construction (§4.H): `ArgToParam`/`ReturnToCallsite`
//! edges between a call site's arguments/return and the callee's
//! parameters/return expressions, context-tagged with k=1 call-site
//! sensitivity so a path cannot enter a callee under one call site and
//! leave under another.

use crate::features::ir_generation::IRDocument;
use crate::shared::models::{Edge, EdgeKind, NodeId};

/// Builds interprocedural DFG edges for every `Calls` edge in `doc` whose
/// target resolves to a known `Function`/`Method` node with `Parameter`
/// children, and whose arguments were tagged during the call's own walk.
///
/// The caller context is the call edge's own span-derived id (unique per
/// call site within the file), giving minimal k=1 context sensitivity:
/// `ArgToParam`/`ReturnToCallsite` pairs sharing a context only join at the
/// call site that produced them.
pub fn build_interprocedural_edges(doc: &mut IRDocument) {
    let calls: Vec<(NodeId, NodeId, String)> = doc
        .edges
        .iter()
        .filter(|e| matches!(e.kind, EdgeKind::Calls))
        .map(|e| (e.source_id.clone(), e.target_id.clone(), call_context(e)))
        .collect();

    let mut new_edges = Vec::new();
    for (caller_id, callee_id, context) in calls {
        if callee_id.starts_with("External:") {
            continue;
        }
        let params: Vec<NodeId> = doc
            .nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(callee_id.as_str()))
            .filter(|n| matches!(n.kind, crate::shared::models::NodeKind::Parameter))
            .map(|n| n.id.clone())
            .collect();
        for param in params {
            new_edges.push(
                Edge::new(EdgeKind::ArgToParam, caller_id.clone(), param)
                    .with_attr("caller_context", context.clone())
                    .with_attr("callee_context", context.clone()),
            );
        }
        new_edges.push(
            Edge::new(EdgeKind::ReturnToCallsite, callee_id, caller_id.clone())
                .with_attr("caller_context", context.clone())
                .with_attr("callee_context", context),
        );
    }
    doc.edges.extend(new_edges);
}

fn call_context(edge: &Edge) -> String {
    match &edge.span {
        Some(span) => format!("{}:{}:{}", edge.source_id, span.start_line, span.start_col),
        None => format!("{}:0:0", edge.source_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::IRDocumentTag;
    use crate::shared::models::{Node, NodeKind, Span};

    #[test]
    fn arg_to_param_edges_are_created_for_resolved_callee() {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.nodes.push(Node::new("callee", NodeKind::Function, "callee", "callee", "a.py", Span::zero()));
        doc.nodes.push(
            Node::new("callee.p", NodeKind::Parameter, "callee.p", "p", "a.py", Span::zero()).with_parent("callee"),
        );
        doc.edges.push(Edge::new(EdgeKind::Calls, "caller", "callee").with_span(Span::new(1, 0, 1, 5)));

        build_interprocedural_edges(&mut doc);

        assert!(doc.edges.iter().any(|e| matches!(e.kind, EdgeKind::ArgToParam) && e.target_id == "callee.p"));
        assert!(doc.edges.iter().any(|e| matches!(e.kind, EdgeKind::ReturnToCallsite) && e.target_id == "caller"));
    }

    #[test]
    fn external_callee_gets_no_interprocedural_edges() {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.edges.push(Edge::new(EdgeKind::Calls, "caller", Edge::external_id("os.system")));
        let before = doc.edges.len();
        build_interprocedural_edges(&mut doc);
        assert_eq!(doc.edges.len(), before);
    }
}
