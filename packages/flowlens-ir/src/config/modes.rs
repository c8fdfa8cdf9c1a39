use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingMode {
    Fast,
    #[default]
    Balanced,
    Deep,
    Bootstrap,
    Repair,
}

impl FromStr for IndexingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "deep" => Ok(Self::Deep),
            "bootstrap" => Ok(Self::Bootstrap),
            "repair" => Ok(Self::Repair),
            other => Err(format!("unknown indexing mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintMode {
    #[default]
    Basic,
    PathSensitive,
    FieldSensitive,
    /// Requires a project context (a resolved `GlobalContext`); rejected by
    /// callers that only have a single-file build.
    Full,
}

impl FromStr for TaintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "path_sensitive" | "path-sensitive" => Ok(Self::PathSensitive),
            "field_sensitive" | "field-sensitive" => Ok(Self::FieldSensitive),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown taint mode: {other}")),
        }
    }
}

impl TaintMode {
    pub fn requires_project_context(self) -> bool {
        matches!(self, TaintMode::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("FAST".parse::<IndexingMode>().unwrap(), IndexingMode::Fast);
        assert_eq!("Path_Sensitive".parse::<TaintMode>().unwrap(), TaintMode::PathSensitive);
    }

    #[test]
    fn full_taint_mode_requires_project_context() {
        assert!(TaintMode::Full.requires_project_context());
        assert!(!TaintMode::Basic.requires_project_context());
    }
}
