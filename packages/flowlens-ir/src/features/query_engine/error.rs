//! Query-engine error taxonomy (§7).

use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query plan has no anchor pattern")]
    EmptyPattern,
    #[error("anchor node {0} is not present in the traversal graph")]
    UnknownAnchor(String),
    #[error("query plan requires {0} anchors, got {1}")]
    ArityMismatch(usize, usize),
}

impl QueryError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            QueryError::EmptyPattern => ErrorCode::InvalidQueryPlan,
            QueryError::UnknownAnchor(_) => ErrorCode::SymbolNotFound,
            QueryError::ArityMismatch(_, _) => ErrorCode::InvalidQueryPlan,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        RetryCategory::Permanent
    }
}
