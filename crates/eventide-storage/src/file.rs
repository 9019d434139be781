//! Directory-backed [`KeyValueStore`]: one file per key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{KeyValueStore, StorageError, validate_key};

/// Stores each key as a file named after the key inside `root`.
///
/// Each write goes to its own uniquely named temporary file in `root`,
/// which is synced to disk and then renamed over the key's file. Readers
/// and a crash mid-write see either the old value or the new one, never
/// half of each. Clones (and other processes) can write the same key
/// concurrently; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates, if needed) a store rooted at `root`.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the directory can't be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Dropping `tmp` on any error path deletes the temporary file.
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| io_error(key, e))?;
        tmp.write_all(value).map_err(|e| io_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(key, e))?;
        tmp.persist(&path).map_err(|e| io_error(key, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("store");
        let store = FileStore::open(&root).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_set_get_remove_lifecycle() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(store.get("eventide-mock-auth").unwrap().is_none());

        store.set("eventide-mock-auth", b"{}").unwrap();
        assert_eq!(
            store.get("eventide-mock-auth").unwrap().as_deref(),
            Some(&b"{}"[..])
        );
        assert!(dir.path().join("eventide-mock-auth").is_file());

        store.remove("eventide-mock-auth").unwrap();
        assert!(store.get("eventide-mock-auth").unwrap().is_none());
        // Second remove is a no-op.
        store.remove("eventide-mock-auth").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        FileStore::open(dir.path()).unwrap().set("k", b"v").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some(&b"v"[..]));
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_set_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("k", b"v").unwrap();
        store.set("k", b"w").unwrap();
        assert_eq!(entries(dir.path()), ["k"]);
    }

    #[test]
    fn test_failed_set_cleans_up_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        // A non-empty directory where the file should go makes the rename fail.
        fs::create_dir(dir.path().join("k")).unwrap();
        fs::write(dir.path().join("k").join("inner"), b"x").unwrap();

        assert!(matches!(store.set("k", b"v"), Err(StorageError::Io { .. })));
        assert_eq!(entries(dir.path()), ["k"]);
    }

    #[test]
    fn test_concurrent_set_on_clones_all_succeed() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let writers: Vec<_> = (0..8u8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|_| store.set("eventide-mock-auth", &[n; 16]).is_err())
                        .count()
                })
            })
            .collect();
        let failures: usize = writers.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(failures, 0);
        let value = store.get("eventide-mock-auth").unwrap().unwrap();
        assert_eq!(value.len(), 16);
        assert!(value.iter().all(|b| *b == value[0]));
        assert_eq!(entries(dir.path()), ["eventide-mock-auth"]);
    }

    #[test]
    fn test_path_traversal_key_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", b"v"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_get_on_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::create_dir(dir.path().join("k")).unwrap();
        assert!(matches!(store.get("k"), Err(StorageError::Io { .. })));
    }
}
