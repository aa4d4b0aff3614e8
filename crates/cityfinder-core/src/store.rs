// crates/cityfinder-core/src/store.rs

//! Byte-blob key-value storage behind [`crate::FavoritesStore`].

use crate::error::StoreError;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Minimal get/set blob store.
///
/// Writes for one key must be applied in call order.
pub trait KeyValueStore {
    /// Returns `Ok(None)` if nothing was ever stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-process store; contents are lost when it is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Values are written to a temporary sibling and renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        message: e.to_string(),
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| io_error(key, e))?;

        let tmp = self.root.join(format!(".{key}.tmp"));
        let mut file = fs::File::create(&tmp).map_err(|e| io_error(key, e))?;
        file.write_all(value).map_err(|e| io_error(key, e))?;
        file.sync_all().map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", b"[1,2]").unwrap();
        store.set("k", b"[3]").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"[3]".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dir_store_round_trips_and_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("state");
        let mut store = DirStore::new(&root);

        assert_eq!(store.get("FavoriteCityIds").unwrap(), None);
        store.set("FavoriteCityIds", b"[42]").unwrap();
        assert!(root.join("FavoriteCityIds").is_file());

        let reopened = DirStore::new(&root);
        assert_eq!(
            reopened.get("FavoriteCityIds").unwrap(),
            Some(b"[42]".to_vec())
        );
    }

    #[test]
    fn dir_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(tmp.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert_eq!(
                store.set(key, b"x"),
                Err(StoreError::InvalidKey(key.to_string()))
            );
        }
    }

    #[test]
    fn dir_store_reports_unwritable_root() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut store = DirStore::new(blocker.join("nested"));
        assert!(matches!(
            store.set("FavoriteCityIds", b"[]"),
            Err(StoreError::Io { .. })
        ));
    }
}
