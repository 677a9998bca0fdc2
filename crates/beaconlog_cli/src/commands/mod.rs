//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod serve;
pub mod verify;

use beaconlog_core::{LogResult, LogStore};
use beaconlog_storage::FileBackend;
use std::path::Path;

/// Reads the whole log at `path` without creating it.
fn read_log(path: &Path) -> LogResult<String> {
    LogStore::new(FileBackend::new(path)).read_all()
}

/// Reads and strictly decodes the log, returning its size and records.
fn load_records(path: &Path) -> Result<(u64, Vec<Vec<String>>), Box<dyn std::error::Error>> {
    let text = read_log(path)?;
    let records = beaconlog_codec::decode_records(&text)?;
    Ok((text.len() as u64, records))
}
