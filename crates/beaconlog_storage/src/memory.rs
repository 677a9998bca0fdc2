//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An in-memory storage backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
///
/// Writes can be made to fail on demand with [`InMemoryBackend::fail_writes`],
/// which simulates a resource that has become unwritable.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. Reads
/// take a snapshot under the lock and copy it after releasing, so appends
/// never wait for a copy in progress.
///
/// # Example
///
/// ```rust
/// use beaconlog_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.create(b"h\n").unwrap();
/// let offset = backend.append(b"test data\n").unwrap();
/// assert_eq!(offset, 2);
/// assert_eq!(backend.size().unwrap(), 12);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Arc<Vec<u8>>>>,
    reject_writes: AtomicBool,
}

impl InMemoryBackend {
    /// Location reported for in-memory backends.
    pub const LOCATION: &'static str = "memory://";

    /// Creates a new backend whose resource does not exist yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing startup against an existing log.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(Arc::new(data))),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Returns a copy of all data in the backend, if the resource exists.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.snapshot().map(|data| data.as_ref().clone())
    }

    /// Makes subsequent `create` and `append` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.reject_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected {
                location: Self::LOCATION.to_string(),
            });
        }
        Ok(())
    }

    fn snapshot(&self) -> Option<Arc<Vec<u8>>> {
        self.data.read().clone()
    }

    fn not_found() -> StorageError {
        StorageError::NotFound {
            location: Self::LOCATION.to_string(),
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn location(&self) -> String {
        Self::LOCATION.to_string()
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_some())
    }

    fn create(&self, initial: &[u8]) -> StorageResult<bool> {
        let mut data = self.data.write();
        if data.is_some() {
            return Ok(false);
        }

        self.check_writable()?;
        *data = Some(Arc::new(initial.to_vec()));
        Ok(true)
    }

    fn append(&self, new_data: &[u8]) -> StorageResult<u64> {
        let mut guard = self.data.write();
        let data = guard.as_mut().ok_or_else(Self::not_found)?;

        self.check_writable()?;
        let offset = data.len() as u64;
        // Copies only if a reader still holds the previous snapshot.
        Arc::make_mut(data).extend_from_slice(new_data);
        Ok(offset)
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.snapshot()
            .map(|data| data.as_ref().clone())
            .ok_or_else(Self::not_found)
    }

    fn size(&self) -> StorageResult<u64> {
        self.data
            .read()
            .as_ref()
            .map(|data| data.len() as u64)
            .ok_or_else(Self::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn memory_starts_missing() {
        let backend = InMemoryBackend::new();
        assert!(!backend.exists().unwrap());
        assert!(matches!(backend.read_all(), Err(StorageError::NotFound { .. })));
        assert!(matches!(backend.size(), Err(StorageError::NotFound { .. })));
        assert!(matches!(backend.append(b"x"), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn memory_create_once() {
        let backend = InMemoryBackend::new();
        assert!(backend.create(b"first\n").unwrap());
        assert!(!backend.create(b"second\n").unwrap());
        assert_eq!(backend.data(), Some(b"first\n".to_vec()));
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"existing\n".to_vec());
        assert!(!backend.create(b"h\n").unwrap());
        assert_eq!(backend.size().unwrap(), 9);
    }

    #[test]
    fn memory_append_and_read() {
        let backend = InMemoryBackend::new();
        backend.create(b"h\n").unwrap();

        assert_eq!(backend.append(b"hello\n").unwrap(), 2);
        assert_eq!(backend.append(b"world\n").unwrap(), 8);
        assert_eq!(backend.read_all().unwrap(), b"h\nhello\nworld\n");
    }

    #[test]
    fn memory_rejected_write_leaves_data_unchanged() {
        let backend = InMemoryBackend::new();
        backend.create(b"h\n").unwrap();
        backend.append(b"one\n").unwrap();

        backend.fail_writes(true);
        let result = backend.append(b"two\n");
        assert!(matches!(result, Err(StorageError::WriteRejected { .. })));
        assert_eq!(backend.read_all().unwrap(), b"h\none\n");

        backend.fail_writes(false);
        backend.append(b"three\n").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"h\none\nthree\n");
    }

    #[test]
    fn memory_rejected_create() {
        let backend = InMemoryBackend::new();
        backend.fail_writes(true);
        assert!(backend.create(b"h\n").is_err());
        assert!(!backend.exists().unwrap());
    }

    #[test]
    fn memory_reads_during_appends_see_whole_appends() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.create(b"h\n").unwrap();

        let writer = {
            let backend = Arc::clone(&backend);
            thread::spawn(move || {
                let line = format!("{}\n", "x".repeat(1023));
                for _ in 0..200 {
                    backend.append(line.as_bytes()).unwrap();
                }
            })
        };

        let mut last_len = 0;
        for _ in 0..200 {
            let data = backend.read_all().unwrap();
            assert_eq!((data.len() - 2) % 1024, 0);
            assert!(data.len() >= last_len);
            last_len = data.len();
        }

        writer.join().unwrap();
        assert_eq!(backend.size().unwrap(), 2 + 200 * 1024);
    }

    #[test]
    fn memory_concurrent_appends() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.create(b"").unwrap();

        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    for _ in 0..100 {
                        backend.append(&[b'a' + t; 8]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let data = backend.read_all().unwrap();
        assert_eq!(data.len(), 4 * 100 * 8);
        for chunk in data.chunks(8) {
            assert!(chunk.iter().all(|b| *b == chunk[0]));
        }
    }
}
