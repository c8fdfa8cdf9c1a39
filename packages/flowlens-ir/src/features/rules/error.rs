use thiserror::Error;

use crate::errors::{ErrorCode, RetryCategory};

#[derive(Debug, Error)]
pub enum RuleCompileError {
    #[error("failed to parse rule catalog: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("rule {0} has an unrecognized kind")]
    UnknownKind(String),
    #[error("rule {0} has a malformed pattern: {1}")]
    MalformedPattern(String, String),
    #[error("io error reading catalog: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleCompileError {
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidQueryPlan
    }

    pub fn retry_category(&self) -> RetryCategory {
        RetryCategory::Permanent
    }
}
