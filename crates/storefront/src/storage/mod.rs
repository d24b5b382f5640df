//! Local key-value storage backends.
//!
//! The cart store persists a single JSON blob under one key. Any type
//! implementing [`KeyValueStorage`] can back it:
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota
//! - [`FileStorage`] - one file per key in a directory, survives restarts
//! - [`StorageArea`] / [`ContextStorage`] - a storage area shared by several
//!   execution contexts, raising [`StorageEvent`]s in the contexts that did
//!   not make a change

mod area;
mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use area::{ContextId, ContextStorage, StorageArea, StorageEvent};
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors that can occur when accessing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value would exceed the storage quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Total bytes the area would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The key cannot be used as a storage name.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Storage is not available in this context.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-to-string key-value store.
///
/// Mirrors the browser `localStorage` surface. Implementations must be safe
/// to share between threads; every call is a complete, synchronous operation.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value. Returns `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written, including when
    /// the write would exceed a quota. A failed write leaves the previous
    /// value in place.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Deliver change events queued by earlier writes to other contexts.
    ///
    /// Backends that raise no such events do nothing. Callers holding a lock
    /// around a write call this once the lock is released.
    fn flush_events(&self) {}
}
