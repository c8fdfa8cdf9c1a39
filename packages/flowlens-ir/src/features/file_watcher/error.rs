use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("watch root does not exist: {0}")]
    RootNotFound(String),
    #[error("watch root is not a directory: {0}")]
    RootNotDirectory(String),
    #[error("failed to install filesystem watcher: {0}")]
    WatcherSetupFailed(String),
}

impl OrchestratorError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            OrchestratorError::RootNotFound(_) => ErrorCode::FileNotFound,
            OrchestratorError::RootNotDirectory(_) => ErrorCode::FileNotFound,
            OrchestratorError::WatcherSetupFailed(_) => ErrorCode::InternalError,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        match self {
            OrchestratorError::WatcherSetupFailed(_) => RetryCategory::Infrastructure,
            _ => RetryCategory::Permanent,
        }
    }
}
