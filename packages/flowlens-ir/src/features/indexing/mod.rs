//! Component K: external index document emission.

mod builder;
mod content;
mod document;

pub use builder::build_index_documents;
pub use document::IndexDocument;
