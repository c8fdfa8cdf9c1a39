//! Shared module - common types and utilities with zero feature-specific
//! dependencies, used across every component in §4.

pub mod models;
pub mod ports;
pub mod utils;

pub use models::*;
pub use ports::Language;
pub use utils::id_generator::{content_hash, IdGenerator};
pub use utils::scope_stack::ScopeStack;
