//! File-backed storage: one file per key inside a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::KeyValueStorage;
use crate::StorageError;

/// Stores each key as a file named after the key.
///
/// Writes land in a hidden temporary sibling first and are renamed into
/// place, so a crash mid-write never leaves a truncated configuration file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage directory. It is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the quill data directory.
    pub fn default_location() -> Self {
        Self::new(quill_paths::data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value).await.map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(key, e))?;

        debug!(key, path = %path.display(), bytes = value.len(), "wrote storage entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
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

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(storage.get("ai-configs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested/dir"));

        storage.set("active-config-id", "abc").await.unwrap();
        assert_eq!(
            storage.get("active-config-id").await.unwrap().as_deref(),
            Some("abc")
        );
        assert!(!temp_dir.path().join("nested/dir/.active-config-id.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("k", "first").await.unwrap();
        storage.set("k", "second").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("k", "v").await.unwrap();
        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        for key in ["../escape", "a/b", "", ".hidden"] {
            let err = storage.set(key, "v").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "{key}");
        }
    }
}
