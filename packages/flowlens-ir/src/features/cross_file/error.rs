use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("duplicate exported symbol {fqn} declared in both {first} and {second}")]
    DuplicateSymbol { fqn: String, first: String, second: String },
    #[error("dependency graph contains a cycle through {0}")]
    CyclicDependency(String),
}

impl ResolveError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ResolveError::DuplicateSymbol { .. } => ErrorCode::InternalError,
            ResolveError::CyclicDependency(_) => ErrorCode::InternalError,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        RetryCategory::Permanent
    }
}
