//! Multi-index over compiled rules (§4.G): exact maps for the common case,
//! prefix/suffix tries for wildcard patterns, trigram index for `*contains*`.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::compiled::CompiledRule;
use super::pattern::{trigrams, PatternAction};

#[derive(Debug, Default)]
pub struct RuleIndex {
    exact_call_type: HashMap<(String, String), Vec<usize>>,
    exact_call: HashMap<String, Vec<usize>>,
    exact_read_type: HashMap<(String, String), Vec<usize>>,
    /// Keyed on the literal prefix before the first `*`, sorted so a lookup
    /// can binary-search the candidate range.
    prefix_trie: BTreeMap<String, Vec<usize>>,
    /// Same idea over the reversed target string, for suffix wildcards.
    suffix_trie: BTreeMap<String, Vec<usize>>,
    trigram_index: HashMap<String, HashSet<usize>>,
    pub rules: Vec<CompiledRule>,
}

impl RuleIndex {
    pub fn build(rules: Vec<CompiledRule>) -> Self {
        let mut index = Self { rules, ..Default::default() };
        for (i, rule) in index.rules.iter().enumerate() {
            let base_type = rule.pattern.base_type.clone();
            let target = rule.pattern.target.clone();

            match rule.pattern.action {
                PatternAction::Call => {
                    index.exact_call_type.entry((base_type.clone(), target.clone())).or_default().push(i);
                    index.exact_call.entry(target.clone()).or_default().push(i);
                }
                PatternAction::Read => {
                    index.exact_read_type.entry((base_type.clone(), target.clone())).or_default().push(i);
                }
            }

            if let Some((prefix, _)) = target.split_once('*') {
                index.prefix_trie.entry(prefix.to_string()).or_default().push(i);
            }
            if let Some((_, suffix)) = target.rsplit_once('*') {
                let reversed: String = suffix.chars().rev().collect();
                index.suffix_trie.entry(reversed).or_default().push(i);
            }
            for tri in trigrams(&target) {
                index.trigram_index.entry(tri).or_default().insert(i);
            }
        }
        index
    }

    pub fn lookup_call(&self, base_type: &str, call: &str) -> Vec<&CompiledRule> {
        let mut found: Vec<usize> = Vec::new();
        if let Some(ids) = self.exact_call_type.get(&(base_type.to_string(), call.to_string())) {
            found.extend(ids);
        }
        if let Some(ids) = self.exact_call.get(call) {
            found.extend(ids);
        }
        found.extend(self.prefix_candidates(call));
        found.extend(self.suffix_candidates(call));
        found.sort_unstable();
        found.dedup();
        found.into_iter().map(|i| &self.rules[i]).collect()
    }

    pub fn lookup_read(&self, base_type: &str, prop: &str) -> Vec<&CompiledRule> {
        let mut found: Vec<usize> = Vec::new();
        if let Some(ids) = self.exact_read_type.get(&(base_type.to_string(), prop.to_string())) {
            found.extend(ids);
        }
        found.extend(self.prefix_candidates(prop));
        found.extend(self.suffix_candidates(prop));
        found.sort_unstable();
        found.dedup();
        found.into_iter().map(|i| &self.rules[i]).collect()
    }

    pub fn lookup_contains(&self, needle: &str) -> Vec<&CompiledRule> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let grams = trigrams(needle);
        let required = grams.len();
        for tri in &grams {
            if let Some(ids) = self.trigram_index.get(tri) {
                for &i in ids {
                    *counts.entry(i).or_insert(0) += 1;
                }
            }
        }
        let mut found: Vec<usize> = counts
            .into_iter()
            .filter(|(_, count)| required == 0 || *count == required)
            .map(|(i, _)| i)
            .collect();
        found.sort_unstable();
        found.into_iter().map(|i| &self.rules[i]).collect()
    }

    fn prefix_candidates(&self, text: &str) -> Vec<usize> {
        self.prefix_trie
            .range(..=text.to_string())
            .rev()
            .take_while(|(prefix, _)| text.starts_with(prefix.as_str()))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    fn suffix_candidates(&self, text: &str) -> Vec<usize> {
        let reversed: String = text.chars().rev().collect();
        self.suffix_trie
            .range(..=reversed.clone())
            .rev()
            .take_while(|(suffix, _)| reversed.starts_with(suffix.as_str()))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rules::atom::AtomKind;
    use crate::features::rules::pattern::parse_pattern;

    fn rule(id: &str, pattern: &str, kind: AtomKind) -> CompiledRule {
        CompiledRule {
            id: id.to_string(),
            kind,
            pattern: parse_pattern(pattern).unwrap(),
            arg_constraints: Vec::new(),
            severity: "high".to_string(),
            cwe: None,
            language: None,
            framework: None,
            tier: 1,
            subsumed_by: None,
        }
    }

    #[test]
    fn exact_call_lookup_finds_rule() {
        let index = RuleIndex::build(vec![rule("r1", "os:call:system", AtomKind::Sink)]);
        assert_eq!(index.lookup_call("os", "system").len(), 1);
    }

    #[test]
    fn prefix_wildcard_matches_specific_call() {
        let index = RuleIndex::build(vec![rule("r1", "os:call:sys*", AtomKind::Sink)]);
        assert_eq!(index.lookup_call("os", "system").len(), 1);
    }

    #[test]
    fn trigram_lookup_finds_contains_pattern() {
        let index = RuleIndex::build(vec![rule("r1", "os:call:exec_command", AtomKind::Sink)]);
        assert!(!index.lookup_contains("exec_command").is_empty());
    }
}
