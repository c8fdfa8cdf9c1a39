//! Two-phase cross-file resolution (spec §4.E).
//!
//! Phase 1 inserts every file's exported symbols into a concurrent map in
//! parallel; phase 2 resolves every import against that map in parallel.
//! The resolver is pure: the same set of IRDocuments (by id) always yields
//! the same [`GlobalContext`].

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use rayon::prelude::*;

use crate::features::ir_generation::IRDocument;
use crate::shared::models::{EdgeKind, NodeKind};

use super::domain::{GlobalContext, ResolveStats, SymbolEntry, UnresolvedCategory, UnresolvedImport};

/// Symbols below the module/class surface that resolution never targets.
fn is_exportable(kind: NodeKind, name: &str) -> bool {
    matches!(
        kind,
        NodeKind::Function | NodeKind::Class | NodeKind::Method | NodeKind::Variable | NodeKind::Field
    ) && !name.starts_with('_')
}

pub fn resolve(documents: &[IRDocument]) -> GlobalContext {
    let symbol_table: DashMap<String, SymbolEntry> = DashMap::new();

    documents.par_iter().for_each(|doc| {
        for node in &doc.nodes {
            if is_exportable(node.kind, &node.name) {
                symbol_table.entry(node.fqn.clone()).or_insert_with(|| SymbolEntry {
                    owning_file: doc.file_path.clone(),
                    node_id: node.id.clone(),
                    kind: node.kind,
                });
            }
        }
    });

    // module path -> file path, used to match raw import text against files.
    let module_index: HashMap<String, String> = documents
        .iter()
        .map(|doc| (module_path_of(&doc.file_path), doc.file_path.clone()))
        .collect();
    let local_roots: HashSet<&str> = module_index
        .keys()
        .filter_map(|m| m.split('.').next())
        .collect();

    let per_file_results: Vec<(String, Vec<String>, Vec<UnresolvedImport>)> = documents
        .par_iter()
        .map(|doc| {
            let mut deps = Vec::new();
            let mut unresolved = Vec::new();
            for edge in &doc.edges {
                if edge.kind != EdgeKind::Imports {
                    continue;
                }
                let raw = edge.target_id.strip_prefix("External:").unwrap_or(&edge.target_id);
                match resolve_import(raw, &doc.file_path, &module_index, &local_roots) {
                    Ok(target_files) if target_files.len() == 1 => {
                        deps.push(target_files[0].clone());
                    }
                    Ok(target_files) if target_files.len() > 1 => {
                        unresolved.push(UnresolvedImport {
                            importing_file: doc.file_path.clone(),
                            raw: raw.to_string(),
                            category: UnresolvedCategory::Ambiguous,
                        });
                    }
                    Ok(_) => {
                        unresolved.push(UnresolvedImport {
                            importing_file: doc.file_path.clone(),
                            raw: raw.to_string(),
                            category: UnresolvedCategory::UnknownModule,
                        });
                    }
                    Err(category) => {
                        unresolved.push(UnresolvedImport {
                            importing_file: doc.file_path.clone(),
                            raw: raw.to_string(),
                            category,
                        });
                    }
                }
            }
            (doc.file_path.clone(), deps, unresolved)
        })
        .collect();

    let mut file_dependencies: HashMap<String, Vec<String>> = HashMap::new();
    let mut unresolved_imports = Vec::new();
    let mut total_resolved = 0usize;
    for (file, deps, unresolved) in per_file_results {
        total_resolved += deps.len();
        file_dependencies.entry(file).or_default().extend(deps);
        unresolved_imports.extend(unresolved);
    }

    let topological_order = topological_order(documents, &file_dependencies);

    let stats = ResolveStats {
        total_symbols: symbol_table.len(),
        total_files: documents.len(),
        total_resolved_imports: total_resolved,
        total_unresolved_imports: unresolved_imports.len(),
    };

    GlobalContext {
        symbol_table: symbol_table.into_iter().collect(),
        file_dependencies,
        topological_order,
        unresolved_imports,
        stats,
    }
}

/// `pkg/mod.py` -> `pkg.mod`, `pkg/mod.ts` -> `pkg.mod`.
fn module_path_of(file_path: &str) -> String {
    file_path
        .trim_end_matches(".py")
        .trim_end_matches(".tsx")
        .trim_end_matches(".ts")
        .replace('/', ".")
}

/// Best-effort parse of Python/TypeScript import syntax into a candidate
/// module path, then looked up against `module_index`.
fn resolve_import(
    raw: &str,
    importing_file: &str,
    module_index: &HashMap<String, String>,
    local_roots: &HashSet<&str>,
) -> Result<Vec<String>, UnresolvedCategory> {
    let module = extract_module_path(raw, importing_file);

    if let Some(file) = module_index.get(&module) {
        return Ok(vec![file.clone()]);
    }

    // relative imports ("." prefix, or TS "./"/"../") that fail to resolve
    // are local but missing, never external.
    if module.starts_with('.') || raw.trim_start().starts_with('.') {
        return Err(UnresolvedCategory::UnknownModule);
    }

    let root = module.split('.').next().unwrap_or(&module);
    if local_roots.contains(root) {
        return Err(UnresolvedCategory::UnknownModule);
    }
    Err(UnresolvedCategory::External)
}

fn extract_module_path(raw: &str, importing_file: &str) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("from ") {
        let module = rest.split(" import").next().unwrap_or(rest).trim();
        return normalize_relative(module, importing_file);
    }
    if let Some(rest) = raw.strip_prefix("import ") {
        let module = rest.split(" as ").next().unwrap_or(rest).split(',').next().unwrap_or(rest);
        return module.trim().to_string();
    }
    if let Some(idx) = raw.find("from ") {
        let module = raw[idx + 5..].trim().trim_matches(|c| c == '\'' || c == '"' || c == ';');
        return normalize_relative(module, importing_file);
    }
    raw.trim_matches(|c| c == '\'' || c == '"' || c == ';').to_string()
}

fn normalize_relative(module: &str, importing_file: &str) -> String {
    if !module.starts_with('.') {
        return module.replace('/', ".");
    }
    let dir = importing_file.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let mut parts: Vec<&str> = if dir.is_empty() { Vec::new() } else { dir.split('/').collect() };
    let mut rest = module;
    while let Some(stripped) = rest.strip_prefix('.') {
        parts.pop();
        rest = stripped;
    }
    if !rest.is_empty() {
        parts.extend(rest.split('.').filter(|s| !s.is_empty()));
    }
    parts.join(".")
}

fn topological_order(documents: &[IRDocument], file_dependencies: &HashMap<String, Vec<String>>) -> Vec<String> {
    let mut files: Vec<&String> = documents.iter().map(|d| &d.file_path).collect();
    files.sort();

    let mut graph = DiGraph::<String, ()>::new();
    let mut index_of = HashMap::new();
    for file in &files {
        index_of.insert((*file).clone(), graph.add_node((*file).clone()));
    }
    for file in &files {
        if let Some(deps) = file_dependencies.get(*file) {
            for dep in deps {
                if let (Some(&from), Some(&to)) = (index_of.get(*file), index_of.get(dep)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => order.into_iter().map(|idx| graph[idx].clone()).collect(),
        // a cycle exists; fall back to lexicographic order rather than fail
        // the whole build (§4.E only guarantees determinism, not acyclicity).
        Err(_) => files.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir_generation::IRDocumentTag;
    use crate::shared::models::{Edge, Node, Span};

    fn tag() -> IRDocumentTag {
        IRDocumentTag {
            repo_id: "repo".into(),
            snapshot_id: "snap".into(),
            content_hash: "hash".into(),
            parser_version: 1,
        }
    }

    #[test]
    fn resolves_import_to_declaring_file() {
        let mut producer = IRDocument::new("pkg/util.py", tag());
        producer.nodes.push(Node::new(
            "n1",
            NodeKind::Function,
            "pkg.util.helper",
            "helper",
            "pkg/util.py",
            Span::zero(),
        ));

        let mut consumer = IRDocument::new("pkg/main.py", tag());
        consumer
            .edges
            .push(Edge::new(EdgeKind::Imports, "mod1", Edge::external_id("from pkg.util import helper")));

        let ctx = resolve(&[producer, consumer]);
        assert!(ctx.symbol_table.contains_key("pkg.util.helper"));
        assert_eq!(ctx.file_dependencies["pkg/main.py"], vec!["pkg/util.py".to_string()]);
        assert_eq!(ctx.stats.total_unresolved_imports, 0);
    }

    #[test]
    fn unresolvable_relative_import_is_unknown_module() {
        let mut consumer = IRDocument::new("pkg/main.py", tag());
        consumer
            .edges
            .push(Edge::new(EdgeKind::Imports, "mod1", Edge::external_id("from .missing import thing")));

        let ctx = resolve(&[consumer]);
        assert_eq!(ctx.unresolved_imports.len(), 1);
        assert_eq!(ctx.unresolved_imports[0].category, UnresolvedCategory::UnknownModule);
    }

    #[test]
    fn third_party_import_is_external() {
        let mut consumer = IRDocument::new("pkg/main.py", tag());
        consumer
            .edges
            .push(Edge::new(EdgeKind::Imports, "mod1", Edge::external_id("import requests")));

        let ctx = resolve(&[consumer]);
        assert_eq!(ctx.unresolved_imports[0].category, UnresolvedCategory::External);
    }

    #[test]
    fn topological_order_respects_dependency_direction() {
        let mut producer = IRDocument::new("pkg/util.py", tag());
        producer.nodes.push(Node::new(
            "n1",
            NodeKind::Function,
            "pkg.util.helper",
            "helper",
            "pkg/util.py",
            Span::zero(),
        ));
        let mut consumer = IRDocument::new("pkg/main.py", tag());
        consumer
            .edges
            .push(Edge::new(EdgeKind::Imports, "mod1", Edge::external_id("from pkg.util import helper")));

        let ctx = resolve(&[producer, consumer]);
        let main_pos = ctx.topological_order.iter().position(|f| f == "pkg/main.py").unwrap();
        let util_pos = ctx.topological_order.iter().position(|f| f == "pkg/util.py").unwrap();
        assert!(main_pos < util_pos);
    }
}
