//! Error types for the beacon server.

use beaconlog_core::LogError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the beacon server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The access key was missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// Log store error.
    #[error("log store error: {0}")]
    Log(#[from] LogError),

    /// The pixel could be neither read nor created.
    #[error("cannot load or create pixel at {path:?}: {source}")]
    Pixel {
        /// Pixel path.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// A blocking task did not complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Unauthorized => 401,
            ServerError::Log(e) if e.is_not_found() => 404,
            _ => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
