//! Component K (chunk side): boundary derivation feeding `IndexDocument`
//! emission in `features::indexing`.

mod boundary;
mod domain;

pub use boundary::derive_chunks;
pub use domain::{Chunk, ChunkKind};
