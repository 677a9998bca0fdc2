//! # Beaconlog Storage
//!
//! Append-only storage backends for beaconlog.
//!
//! Storage backends are **opaque byte ledgers** - they do not interpret
//! the data they store. Bytes are only ever added at the end; nothing is
//! rewritten or truncated by normal operation.
//!
//! ## Design Principles
//!
//! - Backends are simple byte ledgers (create, append, read everything)
//! - No knowledge of the record format or the header line
//! - Must be `Send + Sync` and internally synchronized
//! - Concurrent appends never interleave; reads never see a partial append
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use beaconlog_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.create(b"header\n").unwrap();
//! let offset = backend.append(b"hello world\n").unwrap();
//! assert_eq!(offset, 7);
//! assert_eq!(backend.read_all().unwrap(), b"header\nhello world\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
