use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum TaintError {
    #[error("taint policy {0} references an unknown rule id")]
    UnknownRule(String),
    #[error("query engine reported an error while executing policy {0}: {1}")]
    PolicyExecutionFailed(String, String),
}

impl TaintError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            TaintError::UnknownRule(_) => ErrorCode::InvalidQueryPlan,
            TaintError::PolicyExecutionFailed(_, _) => ErrorCode::InternalError,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        RetryCategory::Permanent
    }
}
