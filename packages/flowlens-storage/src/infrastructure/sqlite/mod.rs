//! SQLite adapter for [`SnapshotStore`], grounded in the teacher's
//! `rusqlite`-backed chunk store: a single connection behind a mutex,
//! schema created on open, and transactional multi-row writes via
//! `unchecked_transaction`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{RelationRow, SnapshotStore, SymbolRow};
use crate::error::StorageError;
use crate::Result;

#[derive(Clone)]
pub struct SqliteSnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS symbols (
                id TEXT NOT NULL,
                repo_id TEXT NOT NULL,
                snapshot_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                fqn TEXT NOT NULL,
                name TEXT NOT NULL,
                span_json TEXT NOT NULL,
                parent_id TEXT,
                signature_id TEXT,
                type_id TEXT,
                PRIMARY KEY (repo_id, snapshot_id, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_symbols_fqn ON symbols(repo_id, snapshot_id, fqn)",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS relations (
                id TEXT NOT NULL,
                repo_id TEXT NOT NULL,
                snapshot_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                span_json TEXT NOT NULL,
                PRIMARY KEY (repo_id, snapshot_id, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_relations_source ON relations(repo_id, snapshot_id, source_id)",
            [],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn replace_snapshot(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        symbols: Vec<SymbolRow>,
        relations: Vec<RelationRow>,
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM symbols WHERE repo_id = ?1 AND snapshot_id = ?2",
            params![repo_id, snapshot_id],
        )?;
        tx.execute(
            "DELETE FROM relations WHERE repo_id = ?1 AND snapshot_id = ?2",
            params![repo_id, snapshot_id],
        )?;
        for symbol in &symbols {
            tx.execute(
                "INSERT INTO symbols (id, repo_id, snapshot_id, kind, fqn, name, span_json, parent_id, signature_id, type_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    symbol.id,
                    symbol.repo_id,
                    symbol.snapshot_id,
                    symbol.kind,
                    symbol.fqn,
                    symbol.name,
                    symbol.span_json,
                    symbol.parent_id,
                    symbol.signature_id,
                    symbol.type_id,
                ],
            )?;
        }
        for relation in &relations {
            tx.execute(
                "INSERT INTO relations (id, repo_id, snapshot_id, kind, source_id, target_id, span_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    relation.id,
                    relation.repo_id,
                    relation.snapshot_id,
                    relation.kind,
                    relation.source_id,
                    relation.target_id,
                    relation.span_json,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_symbols(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<SymbolRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, repo_id, snapshot_id, kind, fqn, name, span_json, parent_id, signature_id, type_id
             FROM symbols WHERE repo_id = ?1 AND snapshot_id = ?2",
        )?;
        let rows = stmt
            .query_map(params![repo_id, snapshot_id], symbol_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn get_relations(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<RelationRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, repo_id, snapshot_id, kind, source_id, target_id, span_json
             FROM relations WHERE repo_id = ?1 AND snapshot_id = ?2",
        )?;
        let rows = stmt
            .query_map(params![repo_id, snapshot_id], relation_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn find_symbol_by_fqn(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        fqn: &str,
    ) -> Result<Option<SymbolRow>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, repo_id, snapshot_id, kind, fqn, name, span_json, parent_id, signature_id, type_id
             FROM symbols WHERE repo_id = ?1 AND snapshot_id = ?2 AND fqn = ?3",
            params![repo_id, snapshot_id, fqn],
            symbol_from_row,
        )
        .optional()
        .map_err(StorageError::from)
    }

    async fn relations_from(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        source_id: &str,
    ) -> Result<Vec<RelationRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, repo_id, snapshot_id, kind, source_id, target_id, span_json
             FROM relations WHERE repo_id = ?1 AND snapshot_id = ?2 AND source_id = ?3",
        )?;
        let rows = stmt
            .query_map(params![repo_id, snapshot_id, source_id], relation_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn delete_snapshot(&self, repo_id: &str, snapshot_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM symbols WHERE repo_id = ?1 AND snapshot_id = ?2", params![repo_id, snapshot_id])?;
        conn.execute("DELETE FROM relations WHERE repo_id = ?1 AND snapshot_id = ?2", params![repo_id, snapshot_id])?;
        Ok(())
    }
}

fn symbol_from_row(row: &rusqlite::Row) -> rusqlite::Result<SymbolRow> {
    Ok(SymbolRow {
        id: row.get(0)?,
        repo_id: row.get(1)?,
        snapshot_id: row.get(2)?,
        kind: row.get(3)?,
        fqn: row.get(4)?,
        name: row.get(5)?,
        span_json: row.get(6)?,
        parent_id: row.get(7)?,
        signature_id: row.get(8)?,
        type_id: row.get(9)?,
    })
}

fn relation_from_row(row: &rusqlite::Row) -> rusqlite::Result<RelationRow> {
    Ok(RelationRow {
        id: row.get(0)?,
        repo_id: row.get(1)?,
        snapshot_id: row.get(2)?,
        kind: row.get(3)?,
        source_id: row.get(4)?,
        target_id: row.get(5)?,
        span_json: row.get(6)?,
    })
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
            name: fqn.to_string(),
            span_json: "{}".to_string(),
            parent_id: None,
            signature_id: None,
            type_id: None,
        }
    }

    #[tokio::test]
    async fn replace_snapshot_is_transactional_delete_then_insert() {
        let store = SqliteSnapshotStore::in_memory().unwrap();
        store.replace_snapshot("repo", "snap", vec![symbol("s1", "a.f")], vec![]).await.unwrap();
        store.replace_snapshot("repo", "snap", vec![symbol("s2", "a.g")], vec![]).await.unwrap();

        let symbols = store.get_symbols("repo", "snap").await.unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].fqn, "a.g");
    }

    #[tokio::test]
    async fn find_symbol_by_fqn_returns_none_when_absent() {
        let store = SqliteSnapshotStore::in_memory().unwrap();
        store.replace_snapshot("repo", "snap", vec![symbol("s1", "a.f")], vec![]).await.unwrap();
        assert!(store.find_symbol_by_fqn("repo", "snap", "a.missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn open_persists_across_reopen_of_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("snapshots.sqlite3");

        let store = SqliteSnapshotStore::open(&db_path).unwrap();
        store.replace_snapshot("repo", "snap", vec![symbol("s1", "a.f")], vec![]).await.unwrap();
        drop(store);

        let reopened = SqliteSnapshotStore::open(&db_path).unwrap();
        let symbols = reopened.get_symbols("repo", "snap").await.unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].fqn, "a.f");
    }
}
