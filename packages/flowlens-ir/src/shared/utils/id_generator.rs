//! Stable, deterministic ID generation (spec invariant 1: node id stability).

use sha2::{Digest, Sha256};

pub struct IdGenerator;

impl IdGenerator {
    /// `(repo_id, kind, file_path, fqn)` -> stable node id (§4.C).
    pub fn node_id(repo_id: &str, kind: &str, file_path: &str, fqn: &str) -> String {
        Self::hash_to_hex(&format!("{repo_id}:{kind}:{file_path}:{fqn}"))
    }

    /// Same as `node_id` plus a deterministic in-order index, for FQNs that
    /// are ambiguous on their own (lambdas, comprehensions) per §4.C.
    pub fn node_id_indexed(repo_id: &str, kind: &str, file_path: &str, fqn: &str, index: usize) -> String {
        Self::hash_to_hex(&format!("{repo_id}:{kind}:{file_path}:{fqn}#{index}"))
    }

    pub fn file_id(repo_id: &str, file_path: &str) -> String {
        Self::hash_to_hex(&format!("{repo_id}:file:{file_path}"))
    }

    pub fn edge_id(source_id: &str, target_id: &str, kind: &str) -> String {
        Self::hash_to_hex(&format!("{source_id}:{target_id}:{kind}"))
    }

    pub fn block_id(function_id: &str, block_index: usize) -> String {
        format!("bfg:{function_id}:block:{block_index}")
    }

    fn hash_to_hex(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        let digest = hasher.finalize();
        hex_prefix(&digest, 32)
    }
}

/// Content hash of a file's bytes, used as the cache key's content component.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_prefix(&hasher.finalize(), 64)
}

fn hex_prefix(digest: &[u8], chars: usize) -> String {
    let mut s = String::with_capacity(chars);
    for byte in digest {
        if s.len() >= chars {
            break;
        }
        s.push_str(&format!("{byte:02x}"));
    }
    s.truncate(chars);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic() {
        let a = IdGenerator::node_id("repo", "function", "file.py", "module.func");
        let b = IdGenerator::node_id("repo", "function", "file.py", "module.func");
        assert_eq!(a, b);
    }

    #[test]
    fn node_id_differs_on_fqn() {
        let a = IdGenerator::node_id("repo", "function", "file.py", "f1");
        let b = IdGenerator::node_id("repo", "function", "file.py", "f2");
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_is_stable_for_identical_bytes() {
        assert_eq!(content_hash(b"print('hi')"), content_hash(b"print('hi')"));
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }
}
