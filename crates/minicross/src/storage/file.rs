use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::LocalStore;

/// Directory-backed store: one `.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Reversible file name for a key: ASCII letters, digits and `-` pass through,
/// every other byte becomes `_` plus two hex digits.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{:02x}", byte));
        }
    }
    stem
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a half-written value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get("mc::queue"), None);
        store.set("mc::queue", "[]").unwrap();
        assert_eq!(store.get("mc::queue").as_deref(), Some("[]"));
        assert!(dir.path().join("data").join("mc_3a_3aqueue.json").exists());

        store.remove("mc::queue");
        assert_eq!(store.get("mc::queue"), None);
    }

    #[test]
    fn test_keys_map_to_distinct_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("mc::progress::2025-09-27", "a").unwrap();
        store.set("mc::progress::2025-09-28", "b").unwrap();
        assert_eq!(store.get("mc::progress::2025-09-27").as_deref(), Some("a"));
        assert_eq!(store.get("mc::progress::2025-09-28").as_deref(), Some("b"));
    }

    #[test]
    fn test_similar_user_ids_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("mc::stats::a.b", "dot").unwrap();
        store.set("mc::stats::a_b", "underscore").unwrap();
        assert_eq!(store.get("mc::stats::a.b").as_deref(), Some("dot"));
        assert_eq!(store.get("mc::stats::a_b").as_deref(), Some("underscore"));
        assert_ne!(file_stem("a.b"), file_stem("a_b"));
        assert_eq!(file_stem("mc::stats::é"), "mc_3a_3astats_3a_3a_c3_a9");
    }
}
