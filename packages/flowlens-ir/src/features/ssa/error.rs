use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum SsaError {
    #[error("control flow graph for {0} is not well-formed, SSA construction skipped")]
    MalformedCfg(String),
    #[error("entry block unreachable in {0}")]
    UnreachableEntry(String),
}

impl SsaError {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::InternalError
    }

    pub fn retry_category(&self) -> RetryCategory {
        RetryCategory::Permanent
    }
}
