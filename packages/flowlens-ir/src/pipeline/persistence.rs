//! Maps a resolved build's IR nodes/edges onto the `symbols`/`relations`
//! row shapes of the persisted-state port (§4.M, §6). Pure and synchronous;
//! the caller passes the resulting rows to a `SnapshotStore` adapter, whose
//! `replace_snapshot` is async.

use flowlens_storage::{RelationRow, SymbolRow};

use crate::features::ir_generation::IRDocument;

pub fn symbol_rows(repo_id: &str, snapshot_id: &str, documents: &[&IRDocument]) -> Vec<SymbolRow> {
    documents
        .iter()
        .flat_map(|doc| doc.nodes.iter())
        .map(|node| SymbolRow {
            id: node.id.clone(),
            repo_id: repo_id.to_string(),
            snapshot_id: snapshot_id.to_string(),
            kind: format!("{:?}", node.kind),
            fqn: node.fqn.clone(),
            name: node.name.clone(),
            span_json: serde_json::to_string(&node.span).unwrap_or_default(),
            parent_id: node.parent_id.clone(),
            signature_id: None,
            type_id: None,
        })
        .collect()
}

pub fn relation_rows(repo_id: &str, snapshot_id: &str, documents: &[&IRDocument]) -> Vec<RelationRow> {
    documents
        .iter()
        .flat_map(|doc| doc.edges.iter().enumerate())
        .map(|(i, edge)| RelationRow {
            id: format!("{}:{}:{}:{}", edge.source_id, edge.target_id, format!("{:?}", edge.kind), i),
            repo_id: repo_id.to_string(),
            snapshot_id: snapshot_id.to_string(),
            kind: format!("{:?}", edge.kind),
            source_id: edge.source_id.clone(),
            target_id: edge.target_id.clone(),
            span_json: serde_json::to_string(&edge.span).unwrap_or_default(),
        })
        .collect()
}
