//! `PathResult`/`ExecutionResult`/`VerificationSnapshot` (§3.1, §4.I).

use serde::{Deserialize, Serialize};

use crate::shared::models::{EdgeKind, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    pub nodes: Vec<NodeId>,
    pub edge_kinds: Vec<EdgeKind>,
    pub length: usize,
    pub confidence: f64,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSet {
    pub paths: Vec<PathResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Partial,
    Timeout,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub nodes_visited: usize,
    pub paths_found: usize,
    pub truncated_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub data: PathSet,
    pub metadata: ExecutionMetadata,
    pub cursor: Option<String>,
    pub budget_used: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSnapshot {
    pub snapshot_id: String,
    pub engine_version: String,
    pub ruleset_hash: Option<String>,
    pub queryplan_hash: String,
    pub workspace_fingerprint: String,
}
