//! # Beaconlog Core
//!
//! The observation log: a single append-only ledger of encoded records
//! behind one fixed header line.
//!
//! [`LogStore`] owns the backend. Handlers receive it (usually behind an
//! `Arc`) and call [`LogStore::record`] once per beacon fetch. Appends are
//! atomic and durable; reads return everything committed so far and never
//! a partial record.
//!
//! ```rust
//! use beaconlog_core::LogStore;
//! use beaconlog_codec::{BeaconRequest, ClientObservation, HEADER_LINE};
//! use beaconlog_storage::InMemoryBackend;
//!
//! let store = LogStore::open(InMemoryBackend::new()).unwrap();
//! assert_eq!(store.read_all().unwrap(), HEADER_LINE);
//!
//! let request = BeaconRequest::new("p-1").with_remote_addr("9.9.9.9");
//! store.record(&ClientObservation::capture(&request)).unwrap();
//! assert_eq!(store.stats().unwrap().records, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod store;

pub use error::{LogError, LogResult};
pub use store::{LogStats, LogStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
