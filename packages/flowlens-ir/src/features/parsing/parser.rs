//! Thin wrapper over tree-sitter (spec §4.B).

use tree_sitter::{Parser, Tree};

use crate::shared::Language;

use super::error::ParseError;
use super::plugin::plugin_for;

/// Bumped whenever grammar versions or the IR-shape derived from the AST
/// changes; part of every cache key (§4.A) so a parser upgrade alone
/// invalidates stale cache entries without needing an envelope bump.
pub const PARSER_VERSION: u32 = 1;

/// A successful parse, possibly partial (tree-sitter emits ERROR nodes for
/// malformed source rather than failing outright).
pub struct ParsedFile {
    pub tree: Tree,
    pub source: String,
    pub language: Language,
    pub had_syntax_errors: bool,
}

impl ParsedFile {
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

pub struct LanguageParser;

impl LanguageParser {
    pub fn parse(file_path: &str, content: &str) -> Result<ParsedFile, ParseError> {
        let language = Language::from_file_path(file_path)
            .ok_or_else(|| ParseError::UnsupportedLanguage(file_path.to_string()))?;
        Self::parse_as(language, content)
    }

    pub fn parse_as(language: Language, content: &str) -> Result<ParsedFile, ParseError> {
        let plugin = plugin_for(language);
        let mut parser = Parser::new();
        parser
            .set_language(&plugin.ts_language())
            .map_err(|e| ParseError::LanguageSetup(e.to_string()))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ParseError::NoTree(language.name().to_string()))?;

        let had_syntax_errors = tree.root_node().has_error();

        Ok(ParsedFile {
            tree,
            source: content.to_string(),
            language,
            had_syntax_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_python() {
        let parsed = LanguageParser::parse_as(Language::Python, "def f(x):\n    return x\n").unwrap();
        assert!(!parsed.had_syntax_errors);
        assert_eq!(parsed.root().kind(), "module");
    }

    #[test]
    fn degrades_gracefully_on_malformed_source() {
        let parsed = LanguageParser::parse_as(Language::Python, "def f(:\n").unwrap();
        assert!(parsed.had_syntax_errors);
    }

    #[test]
    fn parses_typescript() {
        let parsed =
            LanguageParser::parse_as(Language::TypeScript, "export function f(x: number) { return x; }").unwrap();
        assert!(!parsed.had_syntax_errors);
    }
}
