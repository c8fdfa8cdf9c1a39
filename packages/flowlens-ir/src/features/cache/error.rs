use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("disk full writing cache entry")]
    DiskFull,
    #[error("permission denied accessing cache directory: {0}")]
    Permission(String),
    #[error("corrupt payload for key {0}, treated as miss")]
    CorruptPayload(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CacheError::DiskFull | CacheError::Permission(_) => ErrorCode::InternalError,
            _ => ErrorCode::InternalError,
        }
    }

    pub fn retry_category(&self) -> RetryCategory {
        match self {
            CacheError::DiskFull | CacheError::Permission(_) => RetryCategory::Infrastructure,
            CacheError::CorruptPayload(_) => RetryCategory::Permanent,
            CacheError::Io(_) => RetryCategory::Transient,
            CacheError::Serialization(_) => RetryCategory::Permanent,
        }
    }
}
