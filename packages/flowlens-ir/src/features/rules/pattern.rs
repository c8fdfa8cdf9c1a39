//! Pattern parsing ("type:call", "read:prop") and minimal glob matching
//! used by subsumption and the prefix/suffix/trigram indexes (§4.G).

use serde::{Deserialize, Serialize};

use super::error::RuleCompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternAction {
    Call,
    Read,
}

/// A parsed pattern: `{base_type}.{action}:{target}`, e.g. `requests:call:get`
/// or `os.environ:read:get`. The catalog syntax is `"type:call"`/`"read:prop"`
/// meaning the base type is implicit from context (a call on a value of that
/// type, or a property read); we store base type and target separately so
/// the multi-index can key on either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPattern {
    pub base_type: String,
    pub action: PatternAction,
    pub target: String,
    pub raw: String,
}

pub fn parse_pattern(raw: &str) -> Result<ParsedPattern, RuleCompileError> {
    let parts: Vec<&str> = raw.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err(RuleCompileError::MalformedPattern(
            raw.to_string(),
            "expected \"base_type:action:target\"".to_string(),
        ));
    }
    let action = match parts[1] {
        "call" => PatternAction::Call,
        "read" => PatternAction::Read,
        other => {
            return Err(RuleCompileError::MalformedPattern(
                raw.to_string(),
                format!("unknown action {other}, expected call|read"),
            ))
        }
    };
    Ok(ParsedPattern {
        base_type: normalize(parts[0]),
        action,
        target: parts[2].to_string(),
        raw: raw.to_string(),
    })
}

/// Case-normalized, inner-class-separator-normalized key used for exact
/// lookups (`Module::Inner` and `module.inner` collapse to one key).
pub fn normalize(s: &str) -> String {
    s.to_ascii_lowercase().replace("::", ".")
}

/// Minimal single-`*`-wildcard glob match (no regex engine needed for the
/// subsumption structural check).
pub fn glob_matches(pattern: &str, candidate: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == candidate,
        Some((prefix, suffix)) => {
            candidate.len() >= prefix.len() + suffix.len()
                && candidate.starts_with(prefix)
                && candidate.ends_with(suffix)
        }
    }
}

pub fn trigrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return Vec::new();
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_pattern() {
        let p = parse_pattern("requests:call:get").unwrap();
        assert_eq!(p.base_type, "requests");
        assert_eq!(p.action, PatternAction::Call);
        assert_eq!(p.target, "get");
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(parse_pattern("requests:delete:get").is_err());
    }

    #[test]
    fn glob_matches_prefix_wildcard() {
        assert!(glob_matches("os.*", "os.system"));
        assert!(!glob_matches("os.*", "subprocess.run"));
    }

    #[test]
    fn glob_matches_exact_when_no_wildcard() {
        assert!(glob_matches("os.system", "os.system"));
        assert!(!glob_matches("os.system", "os.system2"));
    }
}
