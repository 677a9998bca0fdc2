//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level append-only storage backend.
///
/// Storage backends are **opaque byte ledgers**. They provide simple operations
/// for creating, appending to, and reading back a single resource. The log
/// store owns all format interpretation - backends do not understand records,
/// quoting, or the header line.
///
/// All methods take `&self`: a backend is shared between request handlers
/// and synchronizes internally.
///
/// # Invariants
///
/// - `append` writes its bytes as one contiguous block, never interleaved
///   with the bytes of a concurrent `append`
/// - `append` returns only after the bytes are durable
/// - a failed `append` leaves the committed content unchanged
/// - `read_all` never returns part of an in-flight `append`
/// - `create` never touches a resource that already exists
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Returns a human-readable location for diagnostics (a path or URI).
    fn location(&self) -> String;

    /// Returns true if the backing resource exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self) -> StorageResult<bool>;

    /// Creates the resource with `initial` as its sole content.
    ///
    /// Returns `true` if the resource was created, `false` if it already
    /// existed (in which case it is left untouched).
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be created or the initial
    /// content cannot be made durable.
    fn create(&self, initial: &[u8]) -> StorageResult<bool>;

    /// Appends data to the end of the resource and makes it durable.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the sync fails. The committed
    /// content is unchanged on error.
    fn append(&self, data: &[u8]) -> StorageResult<u64>;

    /// Reads the entire committed content of the resource.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// if the resource does not exist, or an I/O error.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Returns the committed size of the resource in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
