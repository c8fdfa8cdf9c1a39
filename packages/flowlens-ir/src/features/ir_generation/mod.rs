//! Component C: IR generator (AST -> IRDocument).

mod document;
mod python_walker;
mod typescript_walker;

pub use document::{FunctionGraph, IRDocument, IRDocumentTag};

use crate::features::parsing::ParsedFile;
use crate::shared::Language;

/// Walk a parsed file's AST and emit its `IRDocument` (§4.C).
pub fn generate(repo_id: &str, file_path: &str, parsed: &ParsedFile, tag: IRDocumentTag) -> IRDocument {
    let mut doc = IRDocument::new(file_path, tag);
    match parsed.language {
        Language::Python => {
            let mut walker = python_walker::PythonWalker::new(repo_id, file_path, &parsed.source);
            walker.walk(parsed.root(), &mut doc);
        }
        Language::TypeScript => {
            let mut walker = typescript_walker::TypeScriptWalker::new(repo_id, file_path, &parsed.source);
            walker.walk(parsed.root(), &mut doc);
        }
    }
    if parsed.had_syntax_errors {
        doc.diagnostics
            .push("partial tree: source contained syntax errors".to_string());
    }
    doc
}
