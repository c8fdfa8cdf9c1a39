//! Structured, index-optimized content string (§4.K):
//! `"[SUMMARY]...[SIGNATURE]...[CODE]...[META] k=v ..."`.

use crate::features::chunking::Chunk;

pub fn build_content(chunk: &Chunk, code: &str) -> String {
    let mut out = String::new();
    if let Some(summary) = &chunk.summary {
        out.push_str("[SUMMARY] ");
        out.push_str(summary);
        out.push('\n');
    }
    if let Some(signature) = &chunk.signature {
        out.push_str("[SIGNATURE] ");
        out.push_str(signature);
        out.push('\n');
    }
    out.push_str("[CODE]\n");
    out.push_str(code);
    out.push('\n');
    out.push_str("[META] ");
    out.push_str(&format!("kind={} ", chunk.kind.as_str()));
    out.push_str(&format!("file={} ", chunk.file_path));
    if let Some(score) = chunk.repomap_score {
        out.push_str(&format!("repomap_score={score:.4} "));
    }
    out
}

pub fn extract_identifiers(code: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in code.chars().chain(std::iter::once(' ')) {
        if ch.is_alphanumeric() || ch == '_' {
            current.push(ch);
        } else if !current.is_empty() {
            if current.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') && seen.insert(current.clone()) {
                out.push(current.clone());
            }
            current.clear();
        }
    }
    out
}
