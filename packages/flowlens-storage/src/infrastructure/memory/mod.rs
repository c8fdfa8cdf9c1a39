//! In-memory reference adapter: no database, for tests and for embedding
//! the engine without a persistence backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{RelationRow, SnapshotStore, SymbolRow};
use crate::Result;

#[derive(Default)]
struct Tables {
    symbols: Vec<SymbolRow>,
    relations: Vec<RelationRow>,
}

/// Keyed by `(repo_id, snapshot_id)`. Each snapshot's rows live in their
/// own bucket so `replace_snapshot` never touches another snapshot's rows.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    tables: RwLock<HashMap<(String, String), Tables>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn replace_snapshot(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        symbols: Vec<SymbolRow>,
        relations: Vec<RelationRow>,
    ) -> Result<()> {
        let key = (repo_id.to_string(), snapshot_id.to_string());
        let mut tables = self.tables.write().unwrap();
        tables.insert(key, Tables { symbols, relations });
        Ok(())
    }

    async fn get_symbols(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<SymbolRow>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .get(&(repo_id.to_string(), snapshot_id.to_string()))
            .map(|t| t.symbols.clone())
            .unwrap_or_default())
    }

    async fn get_relations(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<RelationRow>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .get(&(repo_id.to_string(), snapshot_id.to_string()))
            .map(|t| t.relations.clone())
            .unwrap_or_default())
    }

    async fn find_symbol_by_fqn(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        fqn: &str,
    ) -> Result<Option<SymbolRow>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .get(&(repo_id.to_string(), snapshot_id.to_string()))
            .and_then(|t| t.symbols.iter().find(|s| s.fqn == fqn).cloned()))
    }

    async fn relations_from(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        source_id: &str,
    ) -> Result<Vec<RelationRow>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .get(&(repo_id.to_string(), snapshot_id.to_string()))
            .map(|t| t.relations.iter().filter(|r| r.source_id == source_id).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_snapshot(&self, repo_id: &str, snapshot_id: &str) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        tables.remove(&(repo_id.to_string(), snapshot_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(id: &str, fqn: &str) -> SymbolRow {
        SymbolRow {
            id: id.to_string(),
            repo_id: "repo".to_string(),
            snapshot_id: "snap".to_string(),
            kind: "Function".to_string(),
            fqn: fqn.to_string(),
            name: fqn.rsplit('.').next().unwrap_or(fqn).to_string(),
            span_json: "{}".to_string(),
            parent_id: None,
            signature_id: None,
            type_id: None,
        }
    }

    #[tokio::test]
    async fn replace_snapshot_overwrites_previous_rows() {
        let store = InMemorySnapshotStore::new();
        store.replace_snapshot("repo", "snap", vec![symbol("s1", "a.f")], vec![]).await.unwrap();
        store.replace_snapshot("repo", "snap", vec![symbol("s2", "a.g")], vec![]).await.unwrap();

        let symbols = store.get_symbols("repo", "snap").await.unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].fqn, "a.g");
    }

    #[tokio::test]
    async fn replace_snapshot_does_not_touch_other_snapshots() {
        let store = InMemorySnapshotStore::new();
        store.replace_snapshot("repo", "snap1", vec![symbol("s1", "a.f")], vec![]).await.unwrap();
        store.replace_snapshot("repo", "snap2", vec![symbol("s2", "a.g")], vec![]).await.unwrap();

        assert_eq!(store.get_symbols("repo", "snap1").await.unwrap().len(), 1);
        assert_eq!(store.get_symbols("repo", "snap2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_symbol_by_fqn_looks_up_within_snapshot() {
        let store = InMemorySnapshotStore::new();
        store.replace_snapshot("repo", "snap", vec![symbol("s1", "a.f")], vec![]).await.unwrap();

        let found = store.find_symbol_by_fqn("repo", "snap", "a.f").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_symbol_by_fqn("repo", "snap", "a.missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relations_from_filters_by_source() {
        let store = InMemorySnapshotStore::new();
        let relations = vec![
            RelationRow {
                id: "r1".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                kind: "Calls".to_string(),
                source_id: "s1".to_string(),
                target_id: "s2".to_string(),
                span_json: "{}".to_string(),
            },
            RelationRow {
                id: "r2".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                kind: "Calls".to_string(),
                source_id: "s2".to_string(),
                target_id: "s3".to_string(),
                span_json: "{}".to_string(),
            },
        ];
        store.replace_snapshot("repo", "snap", vec![], relations).await.unwrap();

        let out = store.relations_from("repo", "snap", "s1").await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "r1");
    }
}
