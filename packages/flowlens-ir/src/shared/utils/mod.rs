//! Utilities shared across feature modules.

pub mod id_generator;
pub mod scope_stack;

pub use id_generator::{content_hash, IdGenerator};
pub use scope_stack::ScopeStack;
