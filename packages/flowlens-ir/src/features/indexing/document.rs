//! `IndexDocument` (§4.K, §6): the opaque-to-the-engine unit handed to
//! external search indexes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub chunk_id: String,
    pub repo_id: String,
    pub snapshot_id: String,
    pub file_path: String,
    pub language: String,
    pub symbol_id: Option<String>,
    pub symbol_name: Option<String>,
    pub content: String,
    pub identifiers: Vec<String>,
    pub tags: Vec<(String, String)>,
    pub start_line: u32,
    pub end_line: u32,
    pub created_at: String,
}
