//! Directory-backed key-value storage.
//!
//! Each key lives in its own `<dir>/<key>.json` file. Writes go to a
//! temporary sibling that is synced to disk and then renamed over the
//! target, so an interrupted write leaves the previous value readable.

use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use taskpad_core::storage::{KeyValueStore, StorageError};
use tokio::io::AsyncWriteExt;

/// Shared by every `FileStore` in the process so temp names never repeat
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whether `key` can be stored: non-empty and only `[A-Za-z0-9_-]`
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// [`KeyValueStore`] that keeps one file per key in a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened file store");

        Ok(Self { dir })
    }

    /// Directory holding the key files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{key}.{}.{n}.tmp", std::process::id()));

        if let Err(error) = Self::write_synced(&tmp, value.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(error.into());
        }
        if let Err(error) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(error.into());
        }
        Ok(())
    }

    async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(self.read(key))
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(self.write(key, value))
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(self.remove(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get_item("todoItems").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.set_item("todoItems", "[]".to_string()).await.unwrap();
        store.set_item("todoItems", "[1]".to_string()).await.unwrap();

        assert_eq!(store.get_item("todoItems").await.unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("todoItems.json").exists());
    }

    #[tokio::test]
    async fn no_temporary_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.set_item("a", "1".to_string()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json".to_string()]);
    }

    #[tokio::test]
    async fn two_stores_on_one_directory_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let first = FileStore::open(dir.path()).await.unwrap();
        let second = FileStore::open(dir.path()).await.unwrap();

        let writes = (0..8).map(|n| {
            let store = if n % 2 == 0 { &first } else { &second };
            store.set_item("todoItems", format!("[{n}]"))
        });
        for result in futures::future::join_all(writes).await {
            result.unwrap();
        }

        let value = first.get_item("todoItems").await.unwrap().unwrap();
        assert!((0..8).any(|n| value == format!("[{n}]")));
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["todoItems.json".to_string()]);
    }

    #[test]
    fn key_charset() {
        assert!(is_valid_key("todoItems"));
        assert!(is_valid_key("work_items-2"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../etc"));
        assert!(!is_valid_key("a.json"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.set_item("a", "1".to_string()).await.unwrap();
        store.remove_item("a").await.unwrap();
        store.remove_item("a").await.unwrap();

        assert_eq!(store.get_item("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        let err = store.set_item("../escape", "x".to_string()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(matches!(
            store.get_item("").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn open_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("store");
        let store = FileStore::open(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }
}
