//! Feature modules, one per analysis-pipeline component.
//!
//! Each feature follows the same hexagonal layering as the rest of the
//! workspace: `domain` (pure types), `ports` (traits), `application`
//! (orchestration), `infrastructure` (concrete adapters) where the feature
//! is large enough to warrant the split.

pub mod cache; // A: hierarchical content-addressed cache
pub mod parsing; // B: tree-sitter + language plugins
pub mod ir_generation; // C: AST -> IRDocument
pub mod flow_graph; // D: BFG/CFG
pub mod ssa; // D: dominance frontier + phi placement
pub mod cross_file; // E: global symbol table + import graph
pub mod rules; // G: taint rule compiler + multi-index
pub mod taint_analysis; // H: atom matcher + taint engine
pub mod query_engine; // I: query plan executor
pub mod file_watcher; // J: incremental orchestrator front door
pub mod indexing; // K: IndexDocument emission
pub mod chunking; // K: chunk boundary derivation
pub mod telemetry; // L: match-event buffer + audit
