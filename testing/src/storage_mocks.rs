//! In-memory key-value storage for tests
//!
//! [`InMemoryStore`] behaves like a healthy key-value store by default and can
//! be told to fail reads or writes, or to slow writes down, so persistence
//! code can be tested against the failure modes of a real device store.

#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use taskpad_core::storage::{KeyValueStore, StorageError};

#[derive(Debug, Default)]
struct Inner {
    data: Mutex<HashMap<String, String>>,
    /// Successful writes, in completion order
    log: Mutex<Vec<(String, String)>>,
    write_attempts: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Inner {
    fn data(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `HashMap`-backed [`KeyValueStore`] with failure and latency injection.
///
/// Clones share the same data, so a test can keep one handle for
/// inspection while the code under test owns another.
///
/// # Example
///
/// ```
/// use taskpad_testing::InMemoryStore;
/// use taskpad_core::storage::KeyValueStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// store.set_item("todoItems", "[]".to_string()).await?;
/// assert_eq!(store.value("todoItems").as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
    write_delay: Option<Duration>,
}

impl InMemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every write by `delay` before it lands
    #[must_use]
    pub const fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Seed a raw value, bypassing failure injection and the write log
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.data().insert(key.into(), value.into());
    }

    /// Current value of `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.data().get(key).cloned()
    }

    /// Make subsequent reads fail with [`StorageError::Unavailable`]
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with [`StorageError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes as `(key, value)`, in completion order
    #[must_use]
    pub fn write_log(&self) -> Vec<(String, String)> {
        self.inner.log().clone()
    }

    /// Number of `set_item` calls, failed ones included
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.inner.write_attempts.load(Ordering::SeqCst)
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data().is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move {
            if self.inner.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable);
            }
            Ok(self.value(key))
        })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.inner.write_attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.write_delay {
                tokio::time::sleep(delay).await;
            }
            if self.inner.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable);
            }
            self.inner.data().insert(key.to_string(), value.clone());
            self.inner.log().push((key.to_string(), value));
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            if self.inner.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable);
            }
            self.inner.data().remove(key);
            Ok(())
        })
    }
}
