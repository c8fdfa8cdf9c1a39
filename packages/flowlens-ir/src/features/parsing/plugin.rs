//! Language plugin port (spec §4.B).

use crate::shared::Language;

/// Per-language normalization rules the IR generator defers to, so that the
/// rest of the pipeline never special-cases a specific language.
pub trait LanguagePlugin: Send + Sync {
    fn language(&self) -> Language;

    fn ts_language(&self) -> tree_sitter::Language;

    /// Nested-class / module separator used when building an FQN.
    fn qualifier_separator(&self) -> &'static str {
        "."
    }

    /// Deterministic label for the Nth anonymous lambda/closure in a scope.
    fn lambda_label(&self, index: usize) -> String {
        format!("<lambda_{index}>")
    }

    /// Deterministic label for the Nth anonymous class in a scope.
    fn anonymous_class_label(&self, index: usize) -> String {
        format!("<anon_class_{index}>")
    }

    fn is_builtin_type(&self, name: &str) -> bool;

    /// Tree-sitter node kinds that carry a doc-comment/docstring, in the
    /// order they should be checked against a definition's leading child.
    fn doc_node_kinds(&self) -> &'static [&'static str];
}

pub struct PythonPlugin;

impl LanguagePlugin for PythonPlugin {
    fn language(&self) -> Language {
        Language::Python
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_python::language()
    }

    fn is_builtin_type(&self, name: &str) -> bool {
        matches!(
            name,
            "int" | "float" | "str" | "bool" | "bytes" | "list" | "dict" | "set" | "tuple"
                | "None" | "object" | "frozenset"
        )
    }

    fn doc_node_kinds(&self) -> &'static [&'static str] {
        &["string", "expression_statement"]
    }
}

pub struct TypeScriptPlugin;

impl LanguagePlugin for TypeScriptPlugin {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_typescript::language_typescript()
    }

    fn qualifier_separator(&self) -> &'static str {
        "."
    }

    fn lambda_label(&self, index: usize) -> String {
        format!("<arrow_{index}>")
    }

    fn is_builtin_type(&self, name: &str) -> bool {
        matches!(
            name,
            "number" | "string" | "boolean" | "any" | "unknown" | "void" | "never" | "object"
                | "undefined" | "null" | "bigint" | "symbol"
        )
    }

    fn doc_node_kinds(&self) -> &'static [&'static str] {
        &["comment"]
    }
}

pub fn plugin_for(language: Language) -> Box<dyn LanguagePlugin> {
    match language {
        Language::Python => Box::new(PythonPlugin),
        Language::TypeScript => Box::new(TypeScriptPlugin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_recognizes_builtins() {
        let plugin = plugin_for(Language::Python);
        assert!(plugin.is_builtin_type("dict"));
        assert!(!plugin.is_builtin_type("MyClass"));
    }

    #[test]
    fn typescript_lambda_label_differs_from_python() {
        let py = plugin_for(Language::Python);
        let ts = plugin_for(Language::TypeScript);
        assert_ne!(py.lambda_label(0), ts.lambda_label(0));
    }
}
