//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing resource does not exist.
    #[error("storage not found: {location}")]
    NotFound {
        /// Where the resource was expected.
        location: String,
    },

    /// The backing resource refused the write.
    #[error("write rejected by {location}")]
    WriteRejected {
        /// The resource that refused the write.
        location: String,
    },
}

impl StorageError {
    /// Returns true if the resource was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound { .. } => true,
            StorageError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            StorageError::WriteRejected { .. } => false,
        }
    }
}
