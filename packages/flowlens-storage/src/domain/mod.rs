//! Persisted-state port (§4.M, §6): `symbols`/`relations` tables per
//! repository snapshot, replaced transactionally rather than patched
//! row-by-row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One row of the `symbols` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRow {
    pub id: String,
    pub repo_id: String,
    pub snapshot_id: String,
    pub kind: String,
    pub fqn: String,
    pub name: String,
    pub span_json: String,
    pub parent_id: Option<String>,
    pub signature_id: Option<String>,
    pub type_id: Option<String>,
}

/// One row of the `relations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRow {
    pub id: String,
    pub repo_id: String,
    pub snapshot_id: String,
    pub kind: String,
    pub source_id: String,
    pub target_id: String,
    pub span_json: String,
}

/// Persisted-state port over the `symbols`/`relations` tables (§6).
///
/// `replace_snapshot` is the only write path: a repository's rows for a
/// given snapshot are deleted, then the new rows are bulk-inserted, inside
/// one transaction, so a crash mid-write never leaves a snapshot with a
/// mix of old and new rows.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn replace_snapshot(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        symbols: Vec<SymbolRow>,
        relations: Vec<RelationRow>,
    ) -> Result<()>;

    async fn get_symbols(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<SymbolRow>>;

    async fn get_relations(&self, repo_id: &str, snapshot_id: &str) -> Result<Vec<RelationRow>>;

    async fn find_symbol_by_fqn(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        fqn: &str,
    ) -> Result<Option<SymbolRow>>;

    async fn relations_from(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        source_id: &str,
    ) -> Result<Vec<RelationRow>>;

    /// Drops every row for a (repo, snapshot) pair without replacing them.
    async fn delete_snapshot(&self, repo_id: &str, snapshot_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_row_round_trips_through_json() {
        let row = SymbolRow {
            id: "sym:1".to_string(),
            repo_id: "repo".to_string(),
            snapshot_id: "snap".to_string(),
            kind: "Function".to_string(),
            fqn: "pkg.mod.f".to_string(),
            name: "f".to_string(),
            span_json: "{\"start_line\":1}".to_string(),
            parent_id: None,
            signature_id: None,
            type_id: None,
        };
        let json = serde_json::to_string(&row).unwrap();
        let back: SymbolRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, back);
    }
}
