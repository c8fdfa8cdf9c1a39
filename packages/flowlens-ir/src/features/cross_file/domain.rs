//! Cross-file resolution domain model (spec §4.E).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shared::models::{NodeId, NodeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub owning_file: String,
    pub node_id: NodeId,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedCategory {
    UnknownModule,
    Ambiguous,
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedImport {
    pub importing_file: String,
    pub raw: String,
    pub category: UnresolvedCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveStats {
    pub total_symbols: usize,
    pub total_files: usize,
    pub total_resolved_imports: usize,
    pub total_unresolved_imports: usize,
}

/// Output of component E: the whole-snapshot symbol table and file
/// dependency graph that §4.F's orchestrator threads through to later
/// components (taint, query).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalContext {
    pub symbol_table: HashMap<String, SymbolEntry>,
    /// importer -> set of files it successfully resolved an import against.
    pub file_dependencies: HashMap<String, Vec<String>>,
    pub topological_order: Vec<String>,
    pub unresolved_imports: Vec<UnresolvedImport>,
    pub stats: ResolveStats,
}
