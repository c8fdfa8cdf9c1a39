//! Catalog compilation (§4.G): YAML -> compiled, subsumption-deduped,
//! multi-indexed rules. Exposes incremental compilation keyed by content
//! hash so a directory rebuild only recompiles changed files.

use std::collections::HashMap;

use crate::shared::content_hash;

use super::atom::RawCatalog;
use super::compiled::{ArgConstraint, CompiledRule};
use super::error::RuleCompileError;
use super::index::RuleIndex;
use super::pattern::{normalize, parse_pattern};
use super::subsumption::dedupe;

pub fn compile_catalog(yaml: &str) -> Result<Vec<CompiledRule>, RuleCompileError> {
    let catalog: RawCatalog = serde_yaml::from_str(yaml)?;
    let mut compiled = Vec::new();
    for raw in catalog.all_rules() {
        for raw_pattern in &raw.match_patterns {
            let mut pattern = parse_pattern(raw_pattern)?;
            pattern.base_type = normalize(&pattern.base_type);
            compiled.push(CompiledRule {
                id: raw.id.clone(),
                kind: raw.kind,
                pattern,
                arg_constraints: parse_effect(raw.effect.as_deref()),
                severity: raw.severity.clone(),
                cwe: raw.cwe.clone(),
                language: raw.language.clone(),
                framework: raw.framework.clone(),
                tier: raw.effective_tier(),
                subsumed_by: None,
            });
        }
    }
    Ok(compiled)
}

fn parse_effect(effect: Option<&str>) -> Vec<ArgConstraint> {
    let Some(effect) = effect else { return Vec::new() };
    effect
        .split(',')
        .filter_map(|clause| {
            let (key, value) = clause.split_once(':')?;
            match key.trim() {
                "position" => value.trim().parse().ok().map(ArgConstraint::Position),
                "tainted" => value.trim().parse().ok().map(ArgConstraint::Tainted),
                "regex" => Some(ArgConstraint::Regex(value.trim().to_string())),
                "constant" => Some(ArgConstraint::Constant(value.trim().to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Caches compiled rules per source file by content hash so that
/// recompiling a directory of catalogs only touches files that changed.
#[derive(Default)]
pub struct IncrementalCompiler {
    cache: HashMap<String, (String, Vec<CompiledRule>)>,
}

impl IncrementalCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `files` is `(path, yaml content)`. Returns the fully rebuilt index;
    /// unchanged files reuse their cached compiled rules.
    pub fn compile(&mut self, files: &[(String, String)]) -> Result<RuleIndex, RuleCompileError> {
        let mut all = Vec::new();
        for (path, content) in files {
            let hash = content_hash(content.as_bytes());
            let rules = match self.cache.get(path) {
                Some((cached_hash, rules)) if *cached_hash == hash => rules.clone(),
                _ => {
                    let rules = compile_catalog(content)?;
                    self.cache.insert(path.clone(), (hash, rules.clone()));
                    rules
                }
            };
            all.extend(rules);
        }
        Ok(RuleIndex::build(dedupe(all)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
atoms:
  - id: os-system-sink
    severity: high
    kind: sink
    cwe: CWE-78
    match: ["os:call:system"]
  - id: os-wildcard-sink
    severity: high
    kind: sink
    match: ["os:call:sys*"]
  - id: request-source
    severity: medium
    kind: source
    tags: [heuristic]
    match: ["flask:read:args"]
"#;

    #[test]
    fn compiles_and_dedupes_catalog() {
        let compiled = compile_catalog(CATALOG).unwrap();
        assert_eq!(compiled.len(), 3);
        let kept = dedupe(compiled);
        // os-system-sink (narrower) survives over os-wildcard-sink (broader)
        assert_eq!(kept.iter().filter(|r| r.id == "os-wildcard-sink").count(), 0);
        assert_eq!(kept.iter().filter(|r| r.id == "os-system-sink").count(), 1);
    }

    #[test]
    fn heuristic_tag_without_explicit_tier_gets_tier_three() {
        let compiled = compile_catalog(CATALOG).unwrap();
        let source = compiled.iter().find(|r| r.id == "request-source").unwrap();
        assert_eq!(source.tier, 3);
    }

    #[test]
    fn incremental_compiler_reuses_unchanged_file() {
        let mut compiler = IncrementalCompiler::new();
        let files = vec![("rules.yaml".to_string(), CATALOG.to_string())];
        let first = compiler.compile(&files).unwrap();
        let second = compiler.compile(&files).unwrap();
        assert_eq!(first.rules.len(), second.rules.len());
    }
}
