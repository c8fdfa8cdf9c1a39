//! Chunk-boundary derivation from an `IRDocument` (§4.K).

use crate::features::ir_generation::IRDocument;
use crate::shared::models::NodeKind;

use super::domain::{Chunk, ChunkKind};

/// Derives file/class/function/method chunks from the document's own nodes,
/// plus a best-effort doc-section chunk for any function/class immediately
/// followed by a triple-quoted docstring in the source text.
pub fn derive_chunks(doc: &IRDocument, source: &str, repo_id: &str) -> Vec<Chunk> {
    let lines: Vec<&str> = source.lines().collect();
    let mut chunks = Vec::new();

    chunks.push(Chunk {
        chunk_id: format!("chunk:{repo_id}:file:{}", doc.file_path),
        kind: ChunkKind::File,
        file_path: doc.file_path.clone(),
        symbol_id: None,
        symbol_name: None,
        signature: None,
        summary: None,
        start_line: 1,
        end_line: lines.len() as u32,
        repomap_score: None,
    });

    for node in &doc.nodes {
        let kind = match node.kind {
            NodeKind::Class => ChunkKind::Class,
            NodeKind::Function | NodeKind::Method => ChunkKind::Function,
            _ => continue,
        };

        let repomap_score = node.attrs.get("repomap_score").and_then(|v| v.as_f64());
        let signature = build_signature(doc, node);

        chunks.push(Chunk {
            chunk_id: format!("chunk:{repo_id}:{}:{}", kind.as_str(), node.fqn),
            kind,
            file_path: doc.file_path.clone(),
            symbol_id: Some(node.id.clone()),
            symbol_name: Some(node.name.clone()),
            signature: signature.clone(),
            summary: None,
            start_line: node.span.start_line,
            end_line: node.span.end_line,
            repomap_score,
        });

        if let Some(doc_section) = derive_docstring_chunk(&lines, node, repo_id) {
            chunks.push(doc_section);
        }
    }

    chunks
}

fn build_signature(doc: &IRDocument, node: &crate::shared::models::Node) -> Option<String> {
    let params: Vec<&str> = doc
        .nodes
        .iter()
        .filter(|n| n.parent_id.as_deref() == Some(node.id.as_str()))
        .filter(|n| matches!(n.kind, NodeKind::Parameter))
        .map(|n| n.name.as_str())
        .collect();
    if params.is_empty() && !matches!(node.kind, NodeKind::Function | NodeKind::Method) {
        return None;
    }
    Some(format!("{}({})", node.name, params.join(", ")))
}

/// Looks for a `"""..."""`/`'''...'''` block starting on the line right
/// after a def/class signature line (Python convention).
fn derive_docstring_chunk(lines: &[&str], node: &crate::shared::models::Node, repo_id: &str) -> Option<Chunk> {
    let sig_line = node.span.start_line as usize;
    let candidate = lines.get(sig_line)?.trim();
    let quote = if candidate.starts_with("\"\"\"") {
        "\"\"\""
    } else if candidate.starts_with("'''") {
        "'''"
    } else {
        return None;
    };

    let rest = &candidate[quote.len()..];
    if let Some(end) = rest.find(quote) {
        let summary = rest[..end].trim().to_string();
        return Some(Chunk {
            chunk_id: format!("chunk:{repo_id}:doc_section:{}", node.fqn),
            kind: ChunkKind::DocSection,
            file_path: node.file_path.clone(),
            symbol_id: Some(node.id.clone()),
            symbol_name: Some(node.name.clone()),
            signature: None,
            summary: Some(summary),
            start_line: sig_line as u32 + 1,
            end_line: sig_line as u32 + 1,
            repomap_score: None,
        });
    }

    let mut end_line = sig_line + 1;
    for (offset, line) in lines.iter().enumerate().skip(sig_line + 1) {
        if line.contains(quote) {
            end_line = offset + 1;
            break;
        }
    }
    let summary = lines[sig_line..end_line.min(lines.len())].join(" ").trim().to_string();
    Some(Chunk {
        chunk_id: format!("chunk:{repo_id}:doc_section:{}", node.fqn),
        kind: ChunkKind::DocSection,
        file_path: node.file_path.clone(),
        symbol_id: Some(node.id.clone()),
        symbol_name: Some(node.name.clone()),
        signature: None,
        summary: Some(summary),
        start_line: sig_line as u32 + 1,
        end_line: end_line as u32,
        repomap_score: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::IRDocumentTag;
    use crate::shared::models::{Node, Span};

    fn doc_with_function() -> (IRDocument, String) {
        let tag = IRDocumentTag { repo_id: "r".into(), snapshot_id: "s".into(), content_hash: "h".into(), parser_version: 1 };
        let mut doc = IRDocument::new("a.py", tag);
        doc.nodes.push(Node::new("f", NodeKind::Function, "f", "f", "a.py", Span::new(1, 0, 3, 0)));
        let source = "def f():\n    \"\"\"Does a thing.\"\"\"\n    pass\n".to_string();
        (doc, source)
    }

    #[test]
    fn derives_file_and_function_chunks() {
        let (doc, source) = doc_with_function();
        let chunks = derive_chunks(&doc, &source, "repo");
        assert!(chunks.iter().any(|c| c.kind == ChunkKind::File));
        assert!(chunks.iter().any(|c| c.kind == ChunkKind::Function && c.symbol_name.as_deref() == Some("f")));
    }

    #[test]
    fn derives_docstring_chunk_for_single_line_docstring() {
        let (doc, source) = doc_with_function();
        let chunks = derive_chunks(&doc, &source, "repo");
        let doc_chunk = chunks.iter().find(|c| c.kind == ChunkKind::DocSection).unwrap();
        assert_eq!(doc_chunk.summary.as_deref(), Some("Does a thing."));
    }
}
