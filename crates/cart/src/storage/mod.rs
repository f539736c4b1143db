//! Durable key-value storage for the cart blob.
//!
//! The cart only ever reads and writes one key, but the backends are plain
//! key-value stores so the same storage can be shared with other app state.
//!
//! # Backends
//!
//! - [`MemoryStore`] - Process-local map, used by tests and previews
//! - [`FileStore`] - One file per key under a data directory

use std::future::Future;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors returned by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value store.
///
/// `set` overwrites unconditionally (last write wins). Implementations must
/// be cheap to share across tasks; the cart store moves one into its
/// background writer.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), StorageError>> + Send;
}
