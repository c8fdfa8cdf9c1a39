use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticIrMode {
    Quick,
    Full,
}

impl std::str::FromStr for SemanticIrMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown semantic IR mode: {other}")),
        }
    }
}

/// Per-run build configuration (spec §4.F, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub parallel_workers: usize,
    pub occurrences: bool,
    pub diagnostics: bool,
    pub packages: Vec<String>,
    pub semantic_ir_mode: SemanticIrMode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel_workers: num_cpus::get(),
            occurrences: true,
            diagnostics: true,
            packages: Vec::new(),
            semantic_ir_mode: SemanticIrMode::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_worker_count_matches_available_parallelism() {
        let config = BuildConfig::default();
        assert_eq!(config.parallel_workers, num_cpus::get());
    }
}
