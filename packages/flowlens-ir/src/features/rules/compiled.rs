use serde::{Deserialize, Serialize};

use super::atom::AtomKind;
use super::pattern::ParsedPattern;

/// One of the argument constraints the atom matcher checks before accepting
/// a candidate (position, tainted-flag, regex, constant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArgConstraint {
    Position(usize),
    Tainted(bool),
    Regex(String),
    Constant(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledRule {
    pub id: String,
    pub kind: AtomKind,
    pub pattern: ParsedPattern,
    pub arg_constraints: Vec<ArgConstraint>,
    pub severity: String,
    pub cwe: Option<String>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub tier: u8,
    /// Set by the subsumption pass when a broader already-compiled rule
    /// dominates this one; the narrower rule is kept, the broader one's id
    /// is recorded here for the audit log (Open Question 2).
    pub subsumed_by: Option<String>,
}

impl CompiledRule {
    pub fn key(&self) -> String {
        format!("{}:{:?}:{}", self.pattern.base_type, self.pattern.action, self.pattern.target)
    }
}
