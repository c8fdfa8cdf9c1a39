//! Cache key shape (spec §4.A: "(file_path, content_hash, parser_version[, extra-salt])").

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub file_path: String,
    pub content_hash: String,
    pub parser_version: u32,
    pub extra_salt: Option<String>,
}

impl CacheKey {
    pub fn new(file_path: impl Into<String>, content_hash: impl Into<String>, parser_version: u32) -> Self {
        Self {
            file_path: file_path.into(),
            content_hash: content_hash.into(),
            parser_version,
            extra_salt: None,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.extra_salt = Some(salt.into());
        self
    }

    /// Filesystem-safe representation used as the L2 file name.
    pub fn to_disk_name(&self) -> String {
        let salt = self.extra_salt.as_deref().unwrap_or("");
        format!(
            "{}_{}_{}.flcache",
            sanitize(&self.file_path),
            self.content_hash,
            format!("{}{}", self.parser_version, salt)
        )
    }
}

fn sanitize(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}#v{}",
            self.file_path, self.content_hash, self.parser_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_produce_equal_keys() {
        let a = CacheKey::new("f.py", "hash1", 3);
        let b = CacheKey::new("f.py", "hash1", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn parser_version_is_part_of_the_key() {
        let a = CacheKey::new("f.py", "hash1", 3);
        let b = CacheKey::new("f.py", "hash1", 4);
        assert_ne!(a, b);
    }
}
