//! Runtime configuration (spec §6 ambient concern). No global mutable
//! state: every component takes its config by value or `Arc`.

mod build_config;
mod modes;

pub use build_config::BuildConfig;
pub use modes::{IndexingMode, TaintMode};
