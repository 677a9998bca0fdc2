//! Error types for the log store.

use beaconlog_codec::CodecError;
use beaconlog_storage::StorageError;
use thiserror::Error;

/// Result type for log store operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur in log store operations.
///
/// Only [`LogError::Init`] is meant to be fatal, and only at startup.
/// Append failures drop the record; read failures map to a failed response.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log could not be created.
    #[error("cannot initialize log at {location}: {source}")]
    Init {
        /// Backend location.
        location: String,
        /// Underlying storage failure.
        source: StorageError,
    },

    /// A record could not be appended. Nothing was written.
    #[error("cannot append to log at {location}: {source}")]
    Append {
        /// Backend location.
        location: String,
        /// Underlying storage failure.
        source: StorageError,
    },

    /// The line handed to `append` is not a single terminated record.
    #[error("refusing to append a line without its terminating line feed")]
    Unterminated,

    /// The log does not exist.
    #[error("log not found at {location}")]
    NotFound {
        /// Backend location.
        location: String,
    },

    /// The log exists but could not be read.
    #[error("cannot read log at {location}: {source}")]
    Read {
        /// Backend location.
        location: String,
        /// Underlying storage failure.
        source: StorageError,
    },

    /// The stored content is not well-formed.
    #[error("log content is malformed: {0}")]
    Malformed(#[from] CodecError),
}

impl LogError {
    /// Returns true if the log is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::NotFound { .. })
    }

    /// Returns true if this error should stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LogError::Init { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        let init = LogError::Init {
            location: "requests.csv".into(),
            source: StorageError::WriteRejected {
                location: "requests.csv".into(),
            },
        };
        assert!(init.is_fatal());
        assert!(!init.is_not_found());

        let missing = LogError::NotFound {
            location: "requests.csv".into(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_fatal());
        assert!(!LogError::Unterminated.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = LogError::Append {
            location: "/data/requests.csv".into(),
            source: StorageError::WriteRejected {
                location: "/data/requests.csv".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/requests.csv"));
        assert!(msg.contains("append"));
    }
}
