//! Chunk boundaries (§4.K), trimmed from the teacher's six-level
//! repo/project/module/file/class/function hierarchy down to the kinds the
//! external indexes actually consume: function, class, file, doc-section,
//! and code-block.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    File,
    Class,
    Function,
    DocSection,
    CodeBlock,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::File => "file",
            ChunkKind::Class => "class",
            ChunkKind::Function => "function",
            ChunkKind::DocSection => "doc_section",
            ChunkKind::CodeBlock => "code_block",
        }
    }
}

/// One derived chunk boundary, carrying just enough to build an
/// `IndexDocument` downstream: its symbol (if any), span, and signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub kind: ChunkKind,
    pub file_path: String,
    pub symbol_id: Option<String>,
    pub symbol_name: Option<String>,
    pub signature: Option<String>,
    pub summary: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub repomap_score: Option<f64>,
}
