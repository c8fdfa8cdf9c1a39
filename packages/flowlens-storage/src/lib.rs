//! Persisted-state port for the flowlens engine (§4.M, §6).
//!
//! Two tables per repository snapshot, `symbols` and `relations`, written
//! only through [`domain::SnapshotStore::replace_snapshot`]: a snapshot's
//! rows are deleted and then bulk-inserted inside one transaction, so a
//! reader never observes a half-replaced snapshot.
//!
//! An in-memory adapter ([`infrastructure::memory::InMemorySnapshotStore`])
//! is always available for tests and for embedding without a database. The
//! SQLite adapter is gated behind the `sqlite` feature.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::{RelationRow, SnapshotStore, SymbolRow};
pub use error::{ErrorKind, Result, StorageError};
pub use infrastructure::memory::InMemorySnapshotStore;
