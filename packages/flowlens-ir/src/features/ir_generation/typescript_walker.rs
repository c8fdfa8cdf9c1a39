//! AST -> IRDocument for TypeScript (§4.B secondary plugin).
//!
//! Narrower than the Python walker by design: module/class/function/const
//! recognition and `export` visibility tagging, no JSX-specific node kinds.

use tree_sitter::Node as TsNode;

use crate::features::flow_graph::CFGBuilder;
use crate::features::ssa::build_ssa;
use crate::shared::models::{Edge, EdgeKind, NodeBuilder, NodeKind};
use crate::shared::{IdGenerator, ScopeStack};

use super::document::{FunctionGraph, IRDocument};
use super::python_walker::span_of;

pub struct TypeScriptWalker<'a> {
    repo_id: &'a str,
    file_path: &'a str,
    source: &'a str,
    scopes: ScopeStack,
}

impl<'a> TypeScriptWalker<'a> {
    pub fn new(repo_id: &'a str, file_path: &'a str, source: &'a str) -> Self {
        Self {
            repo_id,
            file_path,
            source,
            scopes: ScopeStack::new(),
        }
    }

    pub fn walk(&mut self, root: TsNode, doc: &mut IRDocument) {
        let module_fqn = self.file_path.trim_end_matches(".ts").trim_end_matches(".tsx").replace('/', ".");
        let module_id = IdGenerator::node_id(self.repo_id, "module", self.file_path, &module_fqn);
        doc.nodes.push(
            NodeBuilder::new(module_id.clone(), NodeKind::Module, &module_fqn, &module_fqn, self.file_path, span_of(&root, self.source))
                .build(),
        );
        self.walk_block(root, &module_id, &module_fqn, doc);
    }

    fn walk_block(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_statement(child, parent_id, parent_fqn, doc);
        }
    }

    fn walk_statement(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        match node.kind() {
            "export_statement" => {
                if let Some(inner) = node.child(node.child_count().saturating_sub(1)) {
                    self.walk_statement(inner, parent_id, parent_fqn, doc);
                    if let Some(last) = doc.nodes.last_mut() {
                        last.attrs.insert("exported".into(), serde_json::json!(true));
                    }
                }
            }
            "function_declaration" => self.walk_function(node, parent_id, parent_fqn, doc),
            "class_declaration" => self.walk_class(node, parent_id, parent_fqn, doc),
            "import_statement" => self.walk_import(node, parent_id, doc),
            "lexical_declaration" | "variable_declaration" => {
                self.walk_lexical(node, parent_id, parent_fqn, doc)
            }
            "expression_statement" => {
                if let Some(inner) = node.child(0) {
                    if inner.kind() == "call_expression" {
                        self.walk_call(inner, parent_id, doc);
                    }
                }
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.walk_statement(child, parent_id, parent_fqn, doc);
                }
            }
        }
    }

    fn walk_function(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(&n, self.source))
            .unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let fqn = format!("{parent_fqn}.{name}");
        let id = IdGenerator::node_id(self.repo_id, "function", self.file_path, &fqn);
        doc.nodes.push(
            NodeBuilder::new(id.clone(), NodeKind::Function, &fqn, &name, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .build(),
        );
        doc.edges.push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
        self.scopes.declare(&name, id.clone());

        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for p in params.children(&mut cursor) {
                if p.kind() == "required_parameter" || p.kind() == "optional_parameter" {
                    if let Some(pat) = p.child_by_field_name("pattern") {
                        let pname = text(&pat, self.source);
                        let pfqn = format!("{fqn}.{pname}");
                        let pid = IdGenerator::node_id(self.repo_id, "parameter", self.file_path, &pfqn);
                        doc.nodes.push(
                            NodeBuilder::new(pid.clone(), NodeKind::Parameter, &pfqn, &pname, self.file_path, span_of(&p, self.source))
                                .parent(id.clone())
                                .build(),
                        );
                        doc.edges.push(Edge::new(EdgeKind::Contains, id.clone(), pid.clone()));
                        self.scopes.declare(&pname, pid);
                    }
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_block(body, &id, &fqn, doc);
            let cfg = CFGBuilder::build(&id, body, self.source);
            let ssa = build_ssa(&cfg);
            if !cfg.check_well_formed() {
                doc.diagnostics.push(format!("{fqn}: control flow graph is not well-formed"));
            }
            doc.function_graphs.push(FunctionGraph { function_id: id.clone(), cfg, ssa });
        }
    }

    fn walk_class(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(&n, self.source))
            .unwrap_or_default();
        let fqn = format!("{parent_fqn}.{name}");
        let id = IdGenerator::node_id(self.repo_id, "class", self.file_path, &fqn);
        doc.nodes.push(
            NodeBuilder::new(id.clone(), NodeKind::Class, &fqn, &name, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .build(),
        );
        doc.edges.push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
        self.scopes.declare(&name, id.clone());

        if let Some(heritage) = node.child_by_field_name("heritage") {
            let text_val = text(&heritage, self.source);
            if let Some(base) = text_val.strip_prefix("extends ") {
                let target = self
                    .scopes
                    .resolve(base.trim())
                    .cloned()
                    .unwrap_or_else(|| Edge::external_id(base.trim()));
                doc.edges.push(Edge::new(EdgeKind::Inherits, id.clone(), target));
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                if child.kind() == "method_definition" {
                    self.walk_method(child, &id, &fqn, doc);
                }
            }
        }
    }

    fn walk_method(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(&n, self.source))
            .unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let fqn = format!("{parent_fqn}.{name}");
        let id = IdGenerator::node_id(self.repo_id, "method", self.file_path, &fqn);
        doc.nodes.push(
            NodeBuilder::new(id.clone(), NodeKind::Method, &fqn, &name, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .build(),
        );
        doc.edges.push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_block(body, &id, &fqn, doc);
            let cfg = CFGBuilder::build(&id, body, self.source);
            let ssa = build_ssa(&cfg);
            if !cfg.check_well_formed() {
                doc.diagnostics.push(format!("{fqn}: control flow graph is not well-formed"));
            }
            doc.function_graphs.push(FunctionGraph { function_id: id.clone(), cfg, ssa });
        }
    }

    fn walk_import(&mut self, node: TsNode, parent_id: &str, doc: &mut IRDocument) {
        let raw = text(&node, self.source);
        let id = IdGenerator::node_id_indexed(self.repo_id, "import", self.file_path, &raw, doc.nodes.len());
        doc.nodes.push(
            NodeBuilder::new(id.clone(), NodeKind::Import, &raw, &raw, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .build(),
        );
        doc.edges.push(Edge::new(EdgeKind::Imports, parent_id, Edge::external_id(&raw)));
    }

    fn walk_lexical(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let mut cursor = node.walk();
        for declarator in node.children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else { continue };
            let name = text(&name_node, self.source);
            let fqn = format!("{parent_fqn}.{name}");
            let id = IdGenerator::node_id(self.repo_id, "variable", self.file_path, &fqn);
            doc.nodes.push(
                NodeBuilder::new(id.clone(), NodeKind::Variable, &fqn, &name, self.file_path, span_of(&declarator, self.source))
                    .parent(parent_id)
                    .build(),
            );
            doc.edges.push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
            self.scopes.declare(&name, id);
        }
    }

    fn walk_call(&mut self, node: TsNode, parent_id: &str, doc: &mut IRDocument) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let full_text = text(&function, self.source);
        if full_text.is_empty() {
            return;
        }
        let (receiver_name, callee_name) = match full_text.rsplit_once('.') {
            Some((receiver, method)) => (Some(receiver.to_string()), method.to_string()),
            None => (None, full_text.clone()),
        };
        let target_id = self
            .scopes
            .resolve(&callee_name)
            .cloned()
            .unwrap_or_else(|| Edge::external_id(&callee_name));
        let mut edge = Edge::new(EdgeKind::Calls, parent_id, target_id)
            .with_span(span_of(&node, self.source))
            .with_attr("callee_name", callee_name);
        if let Some(receiver) = receiver_name {
            edge = edge.with_attr("receiver_name", receiver);
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            let mut dynamic = Vec::new();
            let mut literals: Vec<Option<String>> = Vec::new();
            for arg in args.named_children(&mut cursor) {
                let (is_dynamic, literal) = arg_shape(arg, self.source);
                dynamic.push(is_dynamic);
                literals.push(literal);
            }
            edge = edge
                .with_attr("arg_count", dynamic.len())
                .with_attr("arg_dynamic", dynamic)
                .with_attr("arg_literals", literals);
        }
        doc.edges.push(edge);
    }
}

fn text(node: &TsNode, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Same syntactic dynamic-vs-literal classification as the Python walker
/// (§4.H, §8 scenario 1 vs 2), adapted to template-string interpolation.
fn arg_shape(node: TsNode, source: &str) -> (bool, Option<String>) {
    match node.kind() {
        "string" => (false, Some(text(&node, source))),
        "template_string" if !has_descendant_kind(node, "template_substitution") => (false, Some(text(&node, source))),
        "number" | "true" | "false" | "null" | "undefined" => (false, Some(text(&node, source))),
        _ => (true, None),
    }
}

fn has_descendant_kind(node: TsNode, kind: &str) -> bool {
    if node.kind() == kind {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| has_descendant_kind(child, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::document::IRDocumentTag;
    use crate::features::parsing::LanguageParser;
    use crate::shared::Language;

    #[test]
    fn exported_function_is_tagged() {
        let source = "export function add(a: number, b: number) { return a + b; }";
        let parsed = LanguageParser::parse_as(Language::TypeScript, source).unwrap();
        let tag = IRDocumentTag {
            repo_id: "repo".into(),
            snapshot_id: "snap".into(),
            content_hash: "hash".into(),
            parser_version: 1,
        };
        let mut doc = IRDocument::new("pkg/mod.ts", tag);
        let mut walker = TypeScriptWalker::new("repo", "pkg/mod.ts", source);
        walker.walk(parsed.root(), &mut doc);
        let func = doc.nodes.iter().find(|n| n.name == "add").unwrap();
        assert_eq!(func.attrs.get("exported"), Some(&serde_json::json!(true)));
    }
}
