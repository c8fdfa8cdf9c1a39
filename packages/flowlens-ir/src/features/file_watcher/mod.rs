//! Component J: the incremental orchestrator — debounced, batched
//! filesystem change notifications feeding `LayeredIRBuilder.build`.

mod debouncer;
mod domain;
mod error;
mod orchestrator;
mod watcher;

pub use domain::{ChangeSet, FileChangeEvent, WatchConfig};
pub use error::OrchestratorError;
pub use orchestrator::Orchestrator;
