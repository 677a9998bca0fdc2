//! Inspect command implementation.

use super::load_records;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Summary of a log file.
#[derive(Debug, Serialize)]
pub struct LogSummary {
    /// Log path.
    pub path: String,
    /// Size in bytes.
    pub bytes: u64,
    /// Number of records, header excluded.
    pub records: usize,
    /// Number of distinct participant ids.
    pub participants: usize,
    /// Timestamp of the first record.
    pub first_seen: Option<String>,
    /// Timestamp of the last record.
    pub last_seen: Option<String>,
}

/// Builds the summary from decoded records (header first).
pub fn summarize(path: &Path, bytes: u64, records: &[Vec<String>]) -> LogSummary {
    let body = records.get(1..).unwrap_or_default();
    let participants: HashSet<&str> = body
        .iter()
        .filter_map(|record| record.get(1).map(String::as_str))
        .collect();

    LogSummary {
        path: path.display().to_string(),
        bytes,
        records: body.len(),
        participants: participants.len(),
        first_seen: body.first().and_then(|r| r.first()).cloned(),
        last_seen: body.last().and_then(|r| r.first()).cloned(),
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (bytes, records) = load_records(path)?;
    let summary = summarize(path, bytes, &records);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("Log: {}", summary.path);
            println!("  Size:         {} bytes", summary.bytes);
            println!("  Records:      {}", summary.records);
            println!("  Participants: {}", summary.participants);
            if let (Some(first), Some(last)) = (&summary.first_seen, &summary.last_seen) {
                println!("  First seen:   {first}");
                println!("  Last seen:    {last}");
            }
        }
    }
    Ok(())
}
