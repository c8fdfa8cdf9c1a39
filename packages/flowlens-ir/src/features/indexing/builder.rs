//! Builds `IndexDocument`s from derived chunks (§4.K).

use crate::features::chunking::Chunk;

use super::content::{build_content, extract_identifiers};
use super::document::IndexDocument;

#[allow(clippy::too_many_arguments)]
pub fn build_index_documents(
    chunks: &[Chunk],
    source: &str,
    repo_id: &str,
    snapshot_id: &str,
    language: &str,
    created_at: &str,
) -> Vec<IndexDocument> {
    let lines: Vec<&str> = source.lines().collect();
    chunks
        .iter()
        .map(|chunk| {
            let code = slice_lines(&lines, chunk.start_line, chunk.end_line);
            let content = build_content(chunk, &code);
            let mut tags = vec![("kind".to_string(), chunk.kind.as_str().to_string())];
            if let Some(score) = chunk.repomap_score {
                tags.push(("repomap_score".to_string(), format!("{score:.4}")));
            }
            IndexDocument {
                id: format!("idx:{}:{}", repo_id, chunk.chunk_id),
                chunk_id: chunk.chunk_id.clone(),
                repo_id: repo_id.to_string(),
                snapshot_id: snapshot_id.to_string(),
                file_path: chunk.file_path.clone(),
                language: language.to_string(),
                symbol_id: chunk.symbol_id.clone(),
                symbol_name: chunk.symbol_name.clone(),
                identifiers: extract_identifiers(&code),
                content,
                tags,
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                created_at: created_at.to_string(),
            }
        })
        .collect()
}

fn slice_lines(lines: &[&str], start_line: u32, end_line: u32) -> String {
    if start_line == 0 || end_line == 0 || start_line as usize > lines.len() {
        return String::new();
    }
    let start = (start_line - 1) as usize;
    let end = (end_line as usize).min(lines.len());
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chunking::ChunkKind;

    #[test]
    fn builds_one_index_document_per_chunk() {
        let chunks = vec![Chunk {
            chunk_id: "chunk:r:function:f".to_string(),
            kind: ChunkKind::Function,
            file_path: "a.py".to_string(),
            symbol_id: Some("f".to_string()),
            symbol_name: Some("f".to_string()),
            signature: Some("f()".to_string()),
            summary: None,
            start_line: 1,
            end_line: 2,
            repomap_score: None,
        }];
        let source = "def f():\n    pass\n";
        let docs = build_index_documents(&chunks, source, "repo", "snap", "python", "2026-01-01T00:00:00Z");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].symbol_name.as_deref(), Some("f"));
        assert!(docs[0].content.contains("def f():"));
    }
}
