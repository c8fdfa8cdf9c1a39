//! Raw rule catalog schema (spec §4.G, §6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomKind {
    Source,
    Sink,
    Sanitizer,
    Propagator,
}

/// One rule object as it appears in a YAML catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRule {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub severity: String,
    pub kind: AtomKind,
    #[serde(rename = "match")]
    pub match_patterns: Vec<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub cwe: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub tier: Option<u8>,
}

/// A catalog file's top level: either `atoms: [...]` mixing all kinds, or a
/// split layout with `sources`/`sinks`/`sanitizers` sequences.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub atoms: Vec<RawRule>,
    #[serde(default)]
    pub sources: Vec<RawRule>,
    #[serde(default)]
    pub sinks: Vec<RawRule>,
    #[serde(default)]
    pub sanitizers: Vec<RawRule>,
}

impl RawCatalog {
    pub fn all_rules(self) -> Vec<RawRule> {
        let mut rules = self.atoms;
        rules.extend(self.sources);
        rules.extend(self.sinks);
        rules.extend(self.sanitizers);
        rules
    }
}

impl RawRule {
    /// Tier defaults: framework-backed rules are tier 2, stdlib-only rules
    /// tier 1, and anything explicitly tagged "heuristic" tier 3, unless the
    /// catalog names a tier directly.
    pub fn effective_tier(&self) -> u8 {
        if let Some(tier) = self.tier {
            return tier;
        }
        if self.tags.iter().any(|t| t == "heuristic") {
            3
        } else if self.framework.is_some() {
            2
        } else {
            1
        }
    }
}
