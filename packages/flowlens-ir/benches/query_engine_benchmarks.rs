//! Cost-aware Dijkstra executor throughput (§4.I) over a synthetic call chain.

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flowlens_ir::features::ir_generation::{IRDocument, IRDocumentTag};
use flowlens_ir::features::query_engine::{execute, QueryKind, QueryPlan, TraversalGraph};
use flowlens_ir::shared::models::{Edge, EdgeKind, Node, NodeKind, Span};

fn node(id: &str) -> Node {
    Node {
        id: id.to_string(),
        kind: NodeKind::Function,
        fqn: id.to_string(),
        name: id.to_string(),
        file_path: "bench.py".to_string(),
        span: Span::zero(),
        parent_id: None,
        attrs: Default::default(),
    }
}

fn call_chain_doc(length: usize) -> IRDocument {
    let tag = IRDocumentTag {
        repo_id: "repo".to_string(),
        snapshot_id: "snap".to_string(),
        content_hash: "hash".to_string(),
        parser_version: 1,
    };
    let mut doc = IRDocument::new("bench.py".to_string(), tag);
    for i in 0..length {
        doc.nodes.push(node(&format!("f{i}")));
        if i > 0 {
            doc.edges.push(Edge::new(EdgeKind::Calls, &format!("f{}", i - 1), &format!("f{i}")));
        }
    }
    doc
}

fn bench_call_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_engine_call_chain");
    for length in [10usize, 100, 1000] {
        let doc = call_chain_doc(length);
        let graph = TraversalGraph::build(&[doc]);
        let plan = QueryPlan::new(QueryKind::CallChain, vec!["f0".to_string(), format!("f{}", length - 1)]);
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| black_box(execute(&plan, &graph, &HashSet::new()).unwrap()));
        });
    }
    group.finish();
}

fn bench_slice_fanout(c: &mut Criterion) {
    let tag = IRDocumentTag {
        repo_id: "repo".to_string(),
        snapshot_id: "snap".to_string(),
        content_hash: "hash".to_string(),
        parser_version: 1,
    };
    let mut doc = IRDocument::new("bench.py".to_string(), tag);
    doc.nodes.push(node("root"));
    for i in 0..500 {
        let child = format!("child{i}");
        doc.nodes.push(node(&child));
        doc.edges.push(Edge::new(EdgeKind::Contains, "root", &child));
    }
    let graph = TraversalGraph::build(&[doc]);
    let mut plan = QueryPlan::new(QueryKind::Slice, vec!["root".to_string()]);
    plan.budget.max_paths = 500;

    c.bench_function("query_engine_slice_fanout_500", |b| {
        b.iter(|| black_box(execute(&plan, &graph, &HashSet::new()).unwrap()));
    });
}

criterion_group!(benches, bench_call_chain, bench_slice_fanout);
criterion_main!(benches);
