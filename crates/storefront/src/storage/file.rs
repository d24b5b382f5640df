//! Directory-backed storage.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStorage, StorageError};

/// Storage that keeps one file per key in a directory.
///
/// Writes go to a uniquely named temporary file in the same directory that
/// is then renamed over the target, so readers see either the old or the new
/// value, never a partially written one, even with several writers.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the stored keys.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_error = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        tmp.write_all(value.as_bytes()).map_err(io_error)?;
        tmp.flush().map_err(io_error)?;
        tmp.persist(&path).map_err(|e| io_error(e.error))?;

        debug!(key, bytes = value.len(), path = %path.display(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    fn temp_storage() -> (TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("cart")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_missing_key_reads_none() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.get_item("react_cart").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let (_dir, storage) = temp_storage();
        storage.set_item("react_cart", "[]").unwrap();

        let reopened = FileStorage::open(storage.dir()).unwrap();
        assert_eq!(reopened.get_item("react_cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, storage) = temp_storage();
        storage.set_item("k", "v").unwrap();
        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_concurrent_writers_never_tear_the_value() {
        let (_dir, storage) = temp_storage();
        let storage = Arc::new(storage);
        let values: Vec<String> = (0..8)
            .map(|i| format!("[{}]", vec![i.to_string(); 2000].join(",")))
            .collect();

        let writers: Vec<_> = values
            .iter()
            .cloned()
            .map(|value| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for _ in 0..20 {
                        storage.set_item("react_cart", &value).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stored = storage.get_item("react_cart").unwrap().unwrap();
        assert!(values.contains(&stored));

        let entries: Vec<_> = fs::read_dir(storage.dir()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary files left behind");
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (_dir, storage) = temp_storage();
        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.get_item(""),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
