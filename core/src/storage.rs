//! String key-value storage abstraction.
//!
//! Application state is persisted as whole string blobs under well-known keys,
//! the way a mobile key-value store works. The trait is deliberately small:
//! read a key, overwrite a key, delete a key. There are no transactions and no
//! partial updates.
//!
//! # Implementations
//!
//! - `FileStore` (in `taskpad-runtime`): one file per key in a directory
//! - `InMemoryStore` (in `taskpad-testing`): `HashMap`-backed, with failure injection
//!
//! # Example
//!
//! ```no_run
//! use taskpad_core::storage::{KeyValueStore, StorageError};
//!
//! async fn example<S: KeyValueStore>(store: &S) -> Result<(), StorageError> {
//!     store.set_item("todoItems", "[]".to_string()).await?;
//!     let value = store.get_item("todoItems").await?;
//!     assert_eq!(value.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Storage cannot currently be reached.
    #[error("Storage unavailable")]
    Unavailable,
}

/// String key-value store.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the trait can be
/// used as `Arc<dyn KeyValueStore>` and captured by long-lived background tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get_item<'a>(&'a self, key: &'a str)
    -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written.
    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the deletion.
    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn invalid_key_message_quotes_key() {
        let err = StorageError::InvalidKey("../etc".to_string());
        assert_eq!(err.to_string(), "Invalid storage key: \"../etc\"");
    }
}
