//! Unified error type for the cart store.

use go_marketplace_core::CartError;
use thiserror::Error;

use crate::codec::CodecError;
use crate::persist::PersistError;
use crate::storage::StorageError;

/// Errors returned by [`CartStore`](crate::CartStore).
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Reading from storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored cart exists but could not be decoded.
    #[error("Stored cart could not be decoded: {0}")]
    Decode(#[from] CodecError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persisting the cart failed.
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Result type alias for `CartStoreError`.
pub type Result<T> = std::result::Result<T, CartStoreError>;
