//! AST -> IRDocument for Python (§4.C).

use tree_sitter::Node as TsNode;

use crate::features::flow_graph::CFGBuilder;
use crate::features::ssa::build_ssa;
use crate::shared::models::{Edge, EdgeKind, NodeBuilder, NodeKind, Span};
use crate::shared::{IdGenerator, ScopeStack};

use super::document::{FunctionGraph, IRDocument};

pub struct PythonWalker<'a> {
    repo_id: &'a str,
    file_path: &'a str,
    source: &'a str,
    scopes: ScopeStack,
    lambda_counter: usize,
}

impl<'a> PythonWalker<'a> {
    pub fn new(repo_id: &'a str, file_path: &'a str, source: &'a str) -> Self {
        Self {
            repo_id,
            file_path,
            source,
            scopes: ScopeStack::new(),
            lambda_counter: 0,
        }
    }

    pub fn walk(&mut self, root: TsNode, doc: &mut IRDocument) {
        let file_id = IdGenerator::file_id(self.repo_id, self.file_path);
        let module_fqn = module_fqn_from_path(self.file_path);
        let module_id = IdGenerator::node_id(self.repo_id, "module", self.file_path, &module_fqn);

        doc.nodes.push(
            NodeBuilder::new(
                file_id.clone(),
                NodeKind::File,
                self.file_path,
                self.file_path,
                self.file_path,
                span_of(&root, self.source),
            )
            .build(),
        );
        doc.nodes.push(
            NodeBuilder::new(
                module_id.clone(),
                NodeKind::Module,
                &module_fqn,
                &module_fqn,
                self.file_path,
                span_of(&root, self.source),
            )
            .parent(file_id.clone())
            .build(),
        );
        doc.edges
            .push(Edge::new(EdgeKind::Contains, file_id, module_id.clone()));

        self.scopes.declare(&module_fqn, module_id.clone());
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
            "function_definition" => self.walk_function(node, parent_id, parent_fqn, doc, false),
            "class_definition" => self.walk_class(node, parent_id, parent_fqn, doc),
            "decorated_definition" => self.walk_decorated(node, parent_id, parent_fqn, doc),
            "import_statement" | "import_from_statement" => {
                self.walk_import(node, parent_id, doc)
            }
            "assignment" => self.walk_assignment(node, parent_id, parent_fqn, doc),
            "expression_statement" => {
                if let Some(inner) = node.child(0) {
                    self.walk_statement(inner, parent_id, parent_fqn, doc);
                }
            }
            "call" => self.walk_call(node, parent_id, doc),
            _ => {
                // Statements we don't model explicitly (if/for/while/etc.)
                // still need their nested definitions and calls discovered.
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.walk_statement(child, parent_id, parent_fqn, doc);
                }
            }
        }
    }

    fn walk_decorated(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let mut decorators = Vec::new();
        let mut definition = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "decorator" => decorators.push(text(&child, self.source)),
                "function_definition" => definition = Some((child, false)),
                "class_definition" => definition = Some((child, true)),
                _ => {}
            }
        }
        match definition {
            Some((def, true)) => self.walk_class(def, parent_id, parent_fqn, doc),
            Some((def, false)) => self.walk_function(def, parent_id, parent_fqn, doc, false),
            None => {}
        }
        if let Some(last) = doc.nodes.last_mut() {
            last.attrs
                .insert("decorators".into(), serde_json::json!(decorators));
        }
    }

    fn walk_function(
        &mut self,
        node: TsNode,
        parent_id: &str,
        parent_fqn: &str,
        doc: &mut IRDocument,
        is_method: bool,
    ) {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(&n, self.source))
            .unwrap_or_default();
        let fqn = format!("{parent_fqn}.{name}");
        let kind = if is_method { NodeKind::Method } else { NodeKind::Function };
        let id = IdGenerator::node_id(self.repo_id, kind_str(kind), self.file_path, &fqn);

        doc.nodes.push(
            NodeBuilder::new(id.clone(), kind, &fqn, &name, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .attr("is_async", node.kind() == "function_definition" && has_async(&node))
                .build(),
        );
        doc.edges
            .push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
        self.scopes.declare(&name, id.clone());

        self.scopes.push();
        if let Some(params) = node.child_by_field_name("parameters") {
            self.walk_parameters(params, &id, &fqn, doc);
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
        self.scopes.pop();
    }

    fn walk_parameters(&mut self, node: TsNode, function_id: &str, function_fqn: &str, doc: &mut IRDocument) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let name_node = match child.kind() {
                "identifier" => Some(child),
                "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                    child.child(0)
                }
                _ => None,
            };
            let Some(name_node) = name_node else { continue };
            let name = text(&name_node, self.source);
            if name.is_empty() {
                continue;
            }
            let fqn = format!("{function_fqn}.{name}");
            let id = IdGenerator::node_id(self.repo_id, "parameter", self.file_path, &fqn);
            doc.nodes.push(
                NodeBuilder::new(id.clone(), NodeKind::Parameter, &fqn, &name, self.file_path, span_of(&child, self.source))
                    .parent(function_id)
                    .build(),
            );
            doc.edges
                .push(Edge::new(EdgeKind::Contains, function_id, id.clone()));
            self.scopes.declare(&name, id);
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
        doc.edges
            .push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
        self.scopes.declare(&name, id.clone());

        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for child in superclasses.children(&mut cursor) {
                if child.kind() == "identifier" {
                    let base_name = text(&child, self.source);
                    if let Some(base_id) = self.scopes.resolve(&base_name).cloned() {
                        doc.edges.push(Edge::new(EdgeKind::Inherits, id.clone(), base_id));
                    } else {
                        doc.edges.push(Edge::new(
                            EdgeKind::Inherits,
                            id.clone(),
                            Edge::external_id(&base_name),
                        ));
                    }
                }
            }
        }

        self.scopes.push();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                if child.kind() == "function_definition" {
                    self.walk_function(child, &id, &fqn, doc, true);
                } else {
                    self.walk_statement(child, &id, &fqn, doc);
                }
            }
        }
        self.scopes.pop();
    }

    fn walk_import(&mut self, node: TsNode, parent_id: &str, doc: &mut IRDocument) {
        let raw = text(&node, self.source);
        let id = IdGenerator::node_id_indexed(
            self.repo_id,
            "import",
            self.file_path,
            &raw,
            doc.nodes.len(),
        );
        doc.nodes.push(
            NodeBuilder::new(id.clone(), NodeKind::Import, &raw, &raw, self.file_path, span_of(&node, self.source))
                .parent(parent_id)
                .build(),
        );
        doc.edges.push(
            Edge::new(EdgeKind::Imports, parent_id, Edge::external_id(&raw)).with_span(span_of(&node, self.source)),
        );
    }

    fn walk_assignment(&mut self, node: TsNode, parent_id: &str, parent_fqn: &str, doc: &mut IRDocument) {
        let Some(left) = node.child_by_field_name("left") else { return };
        let Some(right) = node.child_by_field_name("right") else { return };

        if left.kind() == "identifier" {
            let name = text(&left, self.source);
            let fqn = format!("{parent_fqn}.{name}");
            let id = IdGenerator::node_id(self.repo_id, "variable", self.file_path, &fqn);
            let classification = classify_rhs(&right);
            doc.nodes.push(
                NodeBuilder::new(id.clone(), NodeKind::Variable, &fqn, &name, self.file_path, span_of(&node, self.source))
                    .parent(parent_id)
                    .attr("assignment_kind", classification)
                    .build(),
            );
            doc.edges
                .push(Edge::new(EdgeKind::Contains, parent_id, id.clone()));
            doc.edges
                .push(Edge::new(EdgeKind::Writes, parent_id, id.clone()).with_span(span_of(&node, self.source)));
            self.scopes.declare(&name, id);
        }
        self.walk_statement(right, parent_id, parent_fqn, doc);
    }

    fn walk_call(&mut self, node: TsNode, parent_id: &str, doc: &mut IRDocument) {
        let Some(function) = node.child_by_field_name("function") else { return };
        let (callee_name, receiver_name) = match function.kind() {
            "identifier" => (text(&function, self.source), None),
            "attribute" => {
                let name = function
                    .child_by_field_name("attribute")
                    .map(|a| text(&a, self.source))
                    .unwrap_or_default();
                let receiver = function
                    .child_by_field_name("object")
                    .map(|o| text(&o, self.source));
                (name, receiver)
            }
            _ => (String::new(), None),
        };
        if callee_name.is_empty() {
            return;
        }
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
                if arg.kind() == "call" {
                    self.walk_call(arg, parent_id, doc);
                }
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

/// Whether a call argument is syntactically dynamic (an identifier,
/// f-string interpolation, concatenation, nested call, ...) versus a plain
/// literal, plus that literal's text when it is one. Used by the taint
/// matcher's `arg_constraints` to tell a parameterized call from a
/// concatenated/interpolated one without needing real dataflow (§4.H,
/// §8 scenario 1 vs 2).
fn arg_shape(node: TsNode, source: &str) -> (bool, Option<String>) {
    let node = if node.kind() == "keyword_argument" {
        node.child_by_field_name("value").unwrap_or(node)
    } else {
        node
    };
    match node.kind() {
        "string" if !has_descendant_kind(node, "interpolation") => (false, Some(text(&node, source))),
        "integer" | "float" | "true" | "false" | "none" => (false, Some(text(&node, source))),
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

fn kind_str(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Function => "function",
        NodeKind::Method => "method",
        _ => "node",
    }
}

fn has_async(node: &TsNode) -> bool {
    node.prev_sibling()
        .map(|s| s.kind() == "async")
        .unwrap_or(false)
}

fn classify_rhs(node: &TsNode) -> &'static str {
    match node.kind() {
        "call" => "call",
        "attribute" | "subscript" => "attribute",
        "string" | "integer" | "float" | "true" | "false" | "none" | "list" | "dictionary"
        | "set" | "tuple" => "literal",
        _ => "expression",
    }
}

pub fn module_fqn_from_path(file_path: &str) -> String {
    file_path
        .trim_end_matches(".py")
        .trim_end_matches(".pyi")
        .replace(['/', '\\'], ".")
}

pub fn span_of(node: &TsNode, _source: &str) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        start.row as u32 + 1,
        start.column as u32,
        end.row as u32 + 1,
        end.column as u32,
    )
}

fn text(node: &TsNode, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::document::IRDocumentTag;
    use crate::features::parsing::LanguageParser;
    use crate::shared::Language;

    fn build(source: &str) -> IRDocument {
        let parsed = LanguageParser::parse_as(Language::Python, source).unwrap();
        let tag = IRDocumentTag {
            repo_id: "repo".into(),
            snapshot_id: "snap".into(),
            content_hash: "hash".into(),
            parser_version: 1,
        };
        let mut doc = IRDocument::new("pkg/mod.py", tag);
        let mut walker = PythonWalker::new("repo", "pkg/mod.py", source);
        walker.walk(parsed.root(), &mut doc);
        doc
    }

    #[test]
    fn function_and_parameters_are_emitted() {
        let doc = build("def search_user(user_id):\n    return user_id\n");
        assert!(doc.nodes.iter().any(|n| n.name == "search_user"));
        assert!(doc.nodes.iter().any(|n| n.name == "user_id"));
    }

    #[test]
    fn class_inherits_edge_is_emitted() {
        let doc = build("class Base:\n    pass\n\nclass Child(Base):\n    pass\n");
        assert!(doc
            .edges
            .iter()
            .any(|e| matches!(e.kind, EdgeKind::Inherits)));
    }

    #[test]
    fn call_edge_targets_local_function_when_resolvable() {
        let doc = build("def helper():\n    pass\n\ndef main():\n    helper()\n");
        let helper_id = doc.nodes.iter().find(|n| n.name == "helper").unwrap().id.clone();
        assert!(doc
            .edges
            .iter()
            .any(|e| matches!(e.kind, EdgeKind::Calls) && e.target_id == helper_id));
    }

    #[test]
    fn unresolved_call_gets_external_target() {
        let doc = build("def main():\n    os.getenv('X')\n");
        assert!(doc.edges.iter().any(|e| e.is_external_target()));
    }

    #[test]
    fn edge_referential_integrity_holds() {
        let doc = build(
            "import os\n\nclass Base:\n    pass\n\nclass Child(Base):\n    def method(self, x):\n        y = x\n        return y\n",
        );
        assert!(doc.check_edge_referential_integrity());
    }
}
