//! L2: directory of atomically written cache files (spec §4.A).
//!
//! Writes go to a sibling `.tmp_*` file, are fsynced, then renamed over the
//! final path. Readers validate the envelope (magic + crc32) before
//! returning bytes; a corrupt payload is treated as a miss, never a crash.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::envelope::Envelope;
use super::error::CacheError;
use super::key::CacheKey;

pub struct L2Cache {
    root: PathBuf,
}

impl L2Cache {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let cache = Self { root };
        cache.sweep_orphan_tmp_files()?;
        Ok(cache)
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.to_disk_name())
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        match fs::read(&path) {
            Ok(bytes) => match Envelope::decode(&bytes) {
                Ok(envelope) => {
                    if envelope.content_hash != key.content_hash
                        || envelope.parser_version != key.parser_version
                    {
                        return Ok(None);
                    }
                    Ok(Some(envelope.payload))
                }
                Err(_) => {
                    // Corrupt payload: treated as a miss, never surfaced as
                    // an error to the pipeline (spec §4.A failure modes).
                    let _ = fs::remove_file(&path);
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    pub fn put(&self, key: &CacheKey, payload: &[u8]) -> Result<(), CacheError> {
        let envelope = Envelope {
            parser_version: key.parser_version,
            content_hash: key.content_hash.clone(),
            payload: payload.to_vec(),
        };
        let bytes = envelope.encode();

        let final_path = self.path_for(key);
        let tmp_path = tmp_path_for(&final_path);

        let write_result = (|| -> Result<(), CacheError> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&bytes).map_err(map_disk_full)?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Sweep `.tmp_*` files left behind by a crash mid-write, run on startup.
    pub fn sweep_orphan_tmp_files(&self) -> Result<(), CacheError> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(".tmp_")
            {
                let _ = fs::remove_file(entry.path());
            }
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().is_file() {
                let _ = fs::remove_file(entry.path());
            }
        }
        Ok(())
    }
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    final_path.with_file_name(format!(".tmp_{name}"))
}

fn map_disk_full(e: std::io::Error) -> CacheError {
    if e.kind() == std::io::ErrorKind::Other || e.raw_os_error() == Some(28) {
        CacheError::DiskFull
    } else if e.kind() == std::io::ErrorKind::PermissionDenied {
        CacheError::Permission(e.to_string())
    } else {
        CacheError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_through_disk() {
        let dir = tempdir().unwrap();
        let l2 = L2Cache::new(dir.path()).unwrap();
        let key = CacheKey::new("f.py", "hash1", 2);
        l2.put(&key, b"payload bytes").unwrap();
        assert_eq!(l2.get(&key).unwrap(), Some(b"payload bytes".to_vec()));
    }

    #[test]
    fn orphan_tmp_files_are_swept_on_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".tmp_stale"), b"leftover").unwrap();
        let l2 = L2Cache::new(dir.path()).unwrap();
        assert!(!dir.path().join(".tmp_stale").exists());
        let _ = l2; // kept alive for clarity
    }

    #[test]
    fn stale_parser_version_misses() {
        let dir = tempdir().unwrap();
        let l2 = L2Cache::new(dir.path()).unwrap();
        let key_v1 = CacheKey::new("f.py", "hash1", 1);
        l2.put(&key_v1, b"old").unwrap();
        let key_v2 = CacheKey::new("f.py", "hash1", 2);
        assert_eq!(l2.get(&key_v2).unwrap(), None);
    }
}
