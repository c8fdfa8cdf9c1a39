//! Canonical error envelope (spec §6/§7).
//!
//! Every component module defines its own `thiserror` enum with the
//! precision a typed error gives internal callers; this module aggregates
//! them behind [`FlowlensError`] so that anything crossing the crate
//! boundary sees one of the canonical error codes plus recovery hints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::cache::CacheError;
use crate::features::cross_file::ResolveError;
use crate::features::file_watcher::OrchestratorError;
use crate::features::parsing::ParseError;
use crate::features::query_engine::QueryError;
use crate::features::rules::RuleCompileError;
use crate::features::ssa::SsaError;
use crate::features::taint_analysis::TaintError;

/// Canonical error codes from spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BudgetExceeded,
    Timeout,
    OutOfMemory,
    SnapshotMismatch,
    SnapshotNotFound,
    InvalidQueryPlan,
    PlanTooBroad,
    PlanAmbiguous,
    SymbolNotFound,
    FileNotFound,
    EvidenceNotFound,
    InternalError,
}

/// The three retry categories from spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    Transient,
    Permanent,
    Infrastructure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryHint {
    pub action: String,
    pub parameters: serde_json::Value,
    pub reason: String,
}

impl RecoveryHint {
    pub fn new(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: serde_json::Value::Null,
            reason: reason.into(),
        }
    }
}

/// The wire shape of an error response (spec §6: "error envelope").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error_code: ErrorCode,
    pub message: String,
    pub recovery_hints: Vec<RecoveryHint>,
    pub context: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum FlowlensError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("ssa error: {0}")]
    Ssa(#[from] SsaError),
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("rule compile error: {0}")]
    RuleCompile(#[from] RuleCompileError),
    #[error("taint error: {0}")]
    Taint(#[from] TaintError),
    #[error("query error: {0}")]
    Query(#[from] QueryError),
    #[error("watcher error: {0}")]
    Watcher(#[from] OrchestratorError),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("snapshot mismatch: expected {expected}, found {found}")]
    SnapshotMismatch { expected: String, found: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowlensError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            FlowlensError::Cache(_) => ErrorCode::InternalError,
            FlowlensError::Parse(_) => ErrorCode::InternalError,
            FlowlensError::Ssa(_) => ErrorCode::InternalError,
            FlowlensError::Resolve(e) => e.error_code(),
            FlowlensError::RuleCompile(_) => ErrorCode::InvalidQueryPlan,
            FlowlensError::Taint(_) => ErrorCode::InternalError,
            FlowlensError::Query(e) => e.error_code(),
            FlowlensError::Watcher(e) => e.error_code(),
            FlowlensError::FileNotFound(_) => ErrorCode::FileNotFound,
            FlowlensError::SnapshotMismatch { .. } => ErrorCode::SnapshotMismatch,
            FlowlensError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        match self {
            FlowlensError::Cache(e) => e.retry_category(),
            FlowlensError::Watcher(e) => e.retry_category(),
            FlowlensError::FileNotFound(_) | FlowlensError::SnapshotMismatch { .. } => {
                RetryCategory::Permanent
            }
            _ => RetryCategory::Permanent,
        }
    }

    pub fn recovery_hints(&self) -> Vec<RecoveryHint> {
        match self {
            FlowlensError::FileNotFound(path) => vec![RecoveryHint::new(
                "rebuild_with_valid_paths",
                format!("file '{path}' is not part of the current snapshot"),
            )],
            FlowlensError::SnapshotMismatch { .. } => vec![RecoveryHint::new(
                "reissue_query_against_single_snapshot",
                "results from two snapshots cannot be combined",
            )],
            FlowlensError::Cache(CacheError::DiskFull) => vec![RecoveryHint::new(
                "free_disk_space_or_lower_quota",
                "L2 cache write failed: disk full",
            )],
            _ => Vec::new(),
        }
    }

    pub fn into_envelope(self) -> ErrorEnvelope {
        let code = self.error_code();
        let hints = self.recovery_hints();
        ErrorEnvelope {
            error_code: code,
            message: self.to_string(),
            recovery_hints: hints,
            context: serde_json::Value::Null,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowlensError>;
