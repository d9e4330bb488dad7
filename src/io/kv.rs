use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Key for the inbox snapshot
pub const INBOX_KEY: &str = "inbox";
/// Key for the project registry snapshot (a JSON object in project order)
pub const PROJECTS_KEY: &str = "projects";
/// Key for the now-list snapshot
pub const NOW_KEY: &str = "now";
/// Key for the notes string
pub const NOTES_KEY: &str = "notes";

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize {key}: {source}")]
    SerializeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("store is read-only, refused write to {0}")]
    ReadOnly(String),
}

/// String-keyed snapshot storage. Each value is overwritten whole.
pub trait KvStore {
    /// Read a value; a missing key is `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadError { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        atomic_write(&path, value.as_bytes()).map_err(|e| StoreError::WriteError { path, source: e })
    }
}

/// In-process store, used by tests and embedders
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store that holds `entries` and rejects every write
    pub fn read_only(entries: HashMap<String, String>) -> Self {
        MemoryStore {
            entries,
            read_only: true,
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.get(INBOX_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path());
        store.set(NOTES_KEY, "\"hello\"").unwrap();
        assert_eq!(store.get(NOTES_KEY).unwrap().as_deref(), Some("\"hello\""));
        assert!(tmp.path().join("notes.json").exists());
    }

    #[test]
    fn file_store_overwrites_whole_value() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path());
        store.set(NOW_KEY, "[1,2,3,4,5,6,7]").unwrap();
        store.set(NOW_KEY, "[]").unwrap();
        assert_eq!(store.get(NOW_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_write_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("gone"));
        let err = store.set(INBOX_KEY, "[]").unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));
    }

    #[test]
    fn memory_store_read_only_rejects_writes() {
        let mut store = MemoryStore::read_only(HashMap::new());
        assert!(matches!(
            store.set(PROJECTS_KEY, "{}"),
            Err(StoreError::ReadOnly(_))
        ));
        let mut store = MemoryStore::new();
        store.set(PROJECTS_KEY, "{}").unwrap();
        assert_eq!(store.get(PROJECTS_KEY).unwrap().as_deref(), Some("{}"));
    }
}
