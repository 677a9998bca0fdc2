//! The append-only observation log.

use crate::error::{LogError, LogResult};
use beaconlog_codec::{decode_records, encode, ClientObservation, HEADER_LINE};
use beaconlog_storage::{StorageBackend, StorageError};
use tracing::{debug, info};

/// Summary of a log's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// Committed size in bytes, header included.
    pub bytes: u64,
    /// Number of records, header excluded.
    pub records: usize,
}

/// The observation log.
///
/// Owns a [`StorageBackend`] and exposes exactly three operations on it:
/// initialize, append, and read everything. There is no update, delete,
/// seek or partial read.
///
/// # Thread Safety
///
/// `LogStore` is `Send + Sync` and all operations take `&self`. Concurrent
/// appends are serialized by the backend and land as contiguous blocks in
/// an unspecified order. Reads never hold up appends and wait at most for
/// the append in flight to finish.
#[derive(Debug)]
pub struct LogStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> LogStore<B> {
    /// Wraps a backend without touching it.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Wraps a backend and makes sure it holds at least the standard header.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Init`] if the log cannot be created.
    pub fn open(backend: B) -> LogResult<Self> {
        let store = Self::new(backend);
        store.ensure_initialized(HEADER_LINE)?;
        Ok(store)
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend location, for diagnostics.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Creates the log with `header_line` as its only content if it does
    /// not exist yet.
    ///
    /// An existing log is left exactly as it is; its header is not checked.
    /// Returns `true` if the log was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Init`] if the log cannot be created (missing
    /// parent directory, permissions, disk full).
    pub fn ensure_initialized(&self, header_line: &str) -> LogResult<bool> {
        let created = self
            .backend
            .create(header_line.as_bytes())
            .map_err(|source| LogError::Init {
                location: self.location(),
                source,
            })?;

        if created {
            info!(location = %self.location(), "created log with header");
        } else {
            debug!(location = %self.location(), "log already present, left untouched");
        }
        Ok(created)
    }

    /// Appends one already-terminated line and waits until it is durable.
    ///
    /// Returns the byte offset of the line.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Unterminated`] if `line` does not end with a
    /// line feed, or [`LogError::Append`] if the backend write fails. In
    /// both cases nothing is written.
    pub fn append(&self, line: &str) -> LogResult<u64> {
        if !line.ends_with('\n') {
            return Err(LogError::Unterminated);
        }

        let offset = self
            .backend
            .append(line.as_bytes())
            .map_err(|source| LogError::Append {
                location: self.location(),
                source,
            })?;

        debug!(offset, bytes = line.len(), "appended record");
        Ok(offset)
    }

    /// Encodes an observation and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Append`] if the backend write fails.
    pub fn record(&self, observation: &ClientObservation) -> LogResult<u64> {
        self.append(&encode(observation))
    }

    /// Returns the raw committed bytes of the log.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NotFound`] if the log does not exist, or
    /// [`LogError::Read`] on any other failure.
    pub fn read_bytes(&self) -> LogResult<Vec<u8>> {
        self.backend.read_all().map_err(|source| match source {
            StorageError::NotFound { location } => LogError::NotFound { location },
            source if source.is_not_found() => LogError::NotFound {
                location: self.location(),
            },
            source => LogError::Read {
                location: self.location(),
                source,
            },
        })
    }

    /// Returns the whole log as text, header first.
    ///
    /// Bytes that are not valid UTF-8 (only possible if the file was edited
    /// by hand) are replaced with U+FFFD.
    ///
    /// # Errors
    ///
    /// Same as [`LogStore::read_bytes`].
    pub fn read_all(&self) -> LogResult<String> {
        let bytes = self.read_bytes()?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Counts bytes and records.
    ///
    /// # Errors
    ///
    /// Returns a read error, or [`LogError::Malformed`] if the content does
    /// not parse.
    pub fn stats(&self) -> LogResult<LogStats> {
        let text = self.read_all()?;
        let records = decode_records(&text)?;
        Ok(LogStats {
            bytes: text.len() as u64,
            records: records.len().saturating_sub(1),
        })
    }
}
