//! Error types for the persisted-state port.

use std::fmt;
use thiserror::Error;

/// Storage error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Database errors (SQLite, and any future backend).
    Database,
    /// Serialization/deserialization errors.
    Serialization,
    /// Snapshot not found.
    SnapshotNotFound,
    /// Symbol not found.
    SymbolNotFound,
    /// Transaction errors.
    Transaction,
    /// I/O errors.
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::SnapshotNotFound => "snapshot_not_found",
            ErrorKind::SymbolNotFound => "symbol_not_found",
            ErrorKind::Transaction => "transaction",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct StorageError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), source: None }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn snapshot_not_found(repo_id: impl Into<String>, snapshot_id: impl Into<String>) -> Self {
        Self::new(ErrorKind::SnapshotNotFound, format!("snapshot not found: {}/{}", repo_id.into(), snapshot_id.into()))
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transaction, message)
    }

    /// Maps onto the engine's canonical §6 error codes for callers that
    /// need to fold a storage failure into the shared error envelope.
    pub fn canonical_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            ErrorKind::SymbolNotFound => "SYMBOL_NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::database(format!("sqlite error: {err}")).with_source(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::serialization(format!("json error: {err}")).with_source(err)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_not_found_mentions_both_ids() {
        let err = StorageError::snapshot_not_found("repo", "snap");
        assert_eq!(err.kind, ErrorKind::SnapshotNotFound);
        assert!(err.message.contains("repo"));
        assert!(err.message.contains("snap"));
        assert_eq!(err.canonical_code(), "SNAPSHOT_NOT_FOUND");
    }

    #[test]
    fn database_error_carries_no_source_by_default() {
        let err = StorageError::database("connection failed");
        assert!(err.source.is_none());
        assert_eq!(format!("{err}"), "[database] connection failed");
    }
}
