//! Persistence of the todo list to a key-value store.
//!
//! The whole list is stored as one JSON array under a single key (by default
//! [`DEFAULT_STORAGE_KEY`]). Loading never fails: missing, unreadable or
//! corrupt data all start the app with an empty list.
//!
//! As a [`StateObserver`], [`TodoPersistence`] hands every new list to a
//! [`WriteQueue`], so the newest state always wins and dispatch never waits
//! on storage.

use crate::types::{AppState, TodoItem};
use std::sync::Arc;
use taskpad_core::storage::{KeyValueStore, StorageError};
use taskpad_runtime::{StateObserver, WriteQueue, WriteQueueError};
use thiserror::Error;

/// Key the todo list is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todoItems";

/// Errors from reading or writing the persisted list
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The key-value store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored record is not a valid todo list
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The background writer stopped
    #[error("Write queue error: {0}")]
    Queue(#[from] WriteQueueError),
}

/// Loads and saves the todo list under one storage key
pub struct TodoPersistence {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    queue: WriteQueue,
}

impl TodoPersistence {
    /// Persistence for `key` in `storage`.
    ///
    /// Starts the background writer, so this must run inside a Tokio runtime.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let queue = WriteQueue::spawn(Arc::clone(&storage), key.clone());
        Self {
            storage,
            key,
            queue,
        }
    }

    /// Storage key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored list, `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the read fails or the record does not
    /// parse.
    pub async fn try_load(&self) -> Result<Option<Vec<TodoItem>>, PersistenceError> {
        let Some(raw) = self.storage.get_item(&self.key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Read the stored list, falling back to an empty one.
    ///
    /// Failures are logged, never returned.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> Vec<TodoItem> {
        match self.try_load().await {
            Ok(Some(items)) => {
                tracing::info!(count = items.len(), "Loaded todos");
                metrics::counter!("persistence.loads.total", "outcome" => "loaded").increment(1);
                items
            },
            Ok(None) => {
                tracing::debug!("No stored todos");
                metrics::counter!("persistence.loads.total", "outcome" => "empty").increment(1);
                Vec::new()
            },
            Err(error) => {
                tracing::warn!(%error, "Failed to load todos, starting empty");
                metrics::counter!("persistence.loads.total", "outcome" => "failed").increment(1);
                Vec::new()
            },
        }
    }

    /// Write `items` directly, bypassing the queue.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if serialization or the write fails.
    pub async fn save(&self, items: &[TodoItem]) -> Result<(), PersistenceError> {
        let value = serde_json::to_string(items)?;
        self.storage.set_item(&self.key, value).await?;
        Ok(())
    }

    /// Queue `items` as the next list to write
    pub fn schedule_save(&self, items: &[TodoItem]) {
        match serde_json::to_string(items) {
            Ok(value) => {
                let revision = self.queue.enqueue(value);
                tracing::trace!(key = %self.key, revision, count = items.len(), "Queued save");
            },
            Err(error) => {
                tracing::error!(key = %self.key, %error, "Failed to serialize todos");
            },
        }
    }

    /// Wait until every queued save has been written or has failed
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Queue`] if the writer stopped.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        Ok(self.queue.flush().await?)
    }

    /// Flush and stop the writer; later saves are dropped
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Queue`] if writes were left unsettled.
    pub async fn close(&self) -> Result<(), PersistenceError> {
        Ok(self.queue.close().await?)
    }
}

impl StateObserver<AppState> for TodoPersistence {
    fn state_changed(&self, state: &AppState) {
        self.schedule_save(&state.todos);
    }
}

impl std::fmt::Debug for TodoPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoPersistence")
            .field("key", &self.key)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::types::{Color, DueDate, NewTodo, PhotoSource, TodoId};
    use taskpad_testing::InMemoryStore;

    fn sample() -> Vec<TodoItem> {
        let mut done = NewTodo::new("Pay rent", "before the 5th")
            .with_color(Color::Yellow)
            .with_date(DueDate::from_dmy(5, 3, 2025).unwrap())
            .with_photo(PhotoSource::new("file:///receipt.jpg"))
            .into_item(TodoId::new());
        done.completed = true;
        vec![NewTodo::new("Buy milk", "2%").into_item(TodoId::new()), done]
    }

    fn persistence(store: &InMemoryStore) -> TodoPersistence {
        TodoPersistence::new(Arc::new(store.clone()), DEFAULT_STORAGE_KEY)
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryStore::new();
        let persistence = persistence(&store);
        let items = sample();

        persistence.save(&items).await.unwrap();

        assert_eq!(persistence.load().await, items);
    }

    #[tokio::test]
    async fn missing_record_loads_empty() {
        let store = InMemoryStore::new();
        assert!(persistence(&store).load().await.is_empty());
        assert!(persistence(&store).try_load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_record_loads_empty() {
        let store = InMemoryStore::new();
        store.insert_raw(DEFAULT_STORAGE_KEY, "not json");
        let persistence = persistence(&store);

        assert!(persistence.load().await.is_empty());
        assert!(matches!(
            persistence.try_load().await,
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_store_loads_empty() {
        let store = InMemoryStore::new();
        store.insert_raw(DEFAULT_STORAGE_KEY, "[]");
        store.fail_reads(true);

        assert!(persistence(&store).load().await.is_empty());
    }

    #[tokio::test]
    async fn failed_save_is_reported() {
        let store = InMemoryStore::new();
        store.fail_writes(true);

        let result = persistence(&store).save(&sample()).await;
        assert!(matches!(result, Err(PersistenceError::Storage(_))));
    }

    #[tokio::test]
    async fn observer_writes_latest_list() {
        let store = InMemoryStore::new();
        let persistence = persistence(&store);
        let mut state = AppState::new();

        for item in sample() {
            state.todos.push(item);
            persistence.state_changed(&state);
        }
        persistence.flush().await.unwrap();

        let stored: Vec<TodoItem> =
            serde_json::from_str(&store.value(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored, state.todos);
    }

    #[tokio::test]
    async fn empty_list_is_stored_as_empty_array() {
        let store = InMemoryStore::new();
        let persistence = persistence(&store);

        persistence.state_changed(&AppState::new());
        persistence.close().await.unwrap();

        assert_eq!(store.value(DEFAULT_STORAGE_KEY).as_deref(), Some("[]"));
    }
}
