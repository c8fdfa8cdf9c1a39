use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported language for file: {0}")]
    UnsupportedLanguage(String),
    #[error("tree-sitter failed to set language: {0}")]
    LanguageSetup(String),
    #[error("tree-sitter returned no tree for: {0}")]
    NoTree(String),
}
