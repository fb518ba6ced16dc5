use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::IndexError;

/// Trait for a byte store holding whole-cache snapshots.
/// This allows for different storage implementations (e.g., in-memory, files).
pub trait SnapshotStore: Send + Sync {
    /// Replace the snapshot stored under `key`.
    ///
    /// Readers must observe either the previous snapshot or the new one,
    /// never a partial write.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), IndexError>;
    /// Retrieve a snapshot by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IndexError>;
    /// Whether a snapshot exists under `key`.
    fn exists(&self, key: &str) -> Result<bool, IndexError> {
        Ok(self.get(key)?.is_some())
    }
}

/// An in-memory store using a `RwLock` around a `HashMap`.
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), IndexError> {
        self.snapshots
            .write()
            .map_err(|_| IndexError::backend("poisoned lock"))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IndexError> {
        let guard = self
            .snapshots
            .read()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }
}

/// Snapshot files in one directory.
///
/// Writes go to a temporary sibling which is synced and then renamed over
/// the target.
pub struct FileStore {
    dir: PathBuf,
}

pub const SNAPSHOT_EXTENSION: &str = "cache";

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, IndexError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| IndexError::backend(format!(
            "creating {}: {e}",
            dir.display()
        )))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot stored under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SNAPSHOT_EXTENSION}"))
    }
}

impl SnapshotStore for FileStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), IndexError> {
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.{SNAPSHOT_EXTENSION}.tmp"));
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value)?;
            file.sync_all()?;
            fs::rename(&tmp, &target)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            IndexError::backend(format!("writing {}: {e}", target.display()))
        })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IndexError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IndexError::backend(format!(
                "reading {}: {e}",
                path.display()
            ))),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, IndexError> {
        Ok(self.path_for(key).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SnapshotStore) {
        assert_eq!(store.get("a").unwrap(), None);
        assert!(!store.exists("a").unwrap());

        store.put("a", b"first").unwrap();
        store.put("a", b"second").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"second"[..]));
        assert!(store.exists("a").unwrap());
        assert!(!store.exists("b").unwrap());
    }

    #[test]
    fn in_memory_store_roundtrip() {
        exercise(&InMemoryStore::new());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileStore::open(dir.path()).unwrap());
    }

    #[test]
    fn file_store_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("run", b"payload").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["run.cache".to_string()]);
        assert_eq!(fs::read(store.path_for("run")).unwrap(), b"payload");
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
