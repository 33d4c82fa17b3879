//! Error types for the store module.

use permkit_core::{CoreError, HolderId};
use thiserror::Error;

/// Errors that can occur during store and storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The holder has not been registered with the store.
    #[error("unknown holder: {0}")]
    UnknownHolder(HolderId),

    /// Encoding or decoding of a node collection failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] CoreError),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The persistence worker has shut down.
    #[error("persistence queue closed")]
    QueueClosed,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
