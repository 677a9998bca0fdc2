//! Verify command implementation.

use super::read_log;
use beaconlog_codec::{decode_records, FIELD_COUNT, FIELD_NAMES};
use chrono::DateTime;
use serde::Serialize;
use std::path::Path;

/// Verification result.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    /// Log path.
    pub path: String,
    /// Number of records checked.
    pub records_checked: usize,
    /// Number of valid records.
    pub valid_records: usize,
    /// List of problems found.
    pub errors: Vec<String>,
}

impl VerifyReport {
    /// Returns true if no problems were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks log text: header, field count, timestamp and resolved ip.
pub fn verify_text(path: &Path, text: &str) -> VerifyReport {
    let mut report = VerifyReport {
        path: path.display().to_string(),
        records_checked: 0,
        valid_records: 0,
        errors: Vec::new(),
    };

    let records = match decode_records(text) {
        Ok(records) => records,
        Err(e) => {
            report.errors.push(format!("log does not parse: {e}"));
            return report;
        }
    };

    match records.first() {
        Some(header) if *header == FIELD_NAMES => {}
        Some(header) => report
            .errors
            .push(format!("unexpected header: {}", header.join(","))),
        None => report.errors.push("log is empty, header missing".to_string()),
    }

    for (index, record) in records.iter().enumerate().skip(1) {
        report.records_checked += 1;
        if record.len() != FIELD_COUNT {
            report.errors.push(format!(
                "record {index}: expected {FIELD_COUNT} fields, found {}",
                record.len()
            ));
        } else if DateTime::parse_from_rfc3339(&record[0]).is_err() {
            report
                .errors
                .push(format!("record {index}: invalid timestamp {:?}", record[0]));
        } else if record[4].is_empty() {
            report.errors.push(format!("record {index}: empty ip_used"));
        } else {
            report.valid_records += 1;
        }
    }

    report
}

/// Runs the verify command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_log(path)?;
    let report = verify_text(path, &text);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("Verifying log at {}", report.path);
            println!("  Records checked: {}", report.records_checked);
            println!("  Valid records:   {}", report.valid_records);
            for error in &report.errors {
                println!("  - {error}");
            }
            println!();
            if report.is_ok() {
                println!("✓ Log verification passed");
            } else {
                println!("✗ Log verification failed");
            }
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err("Verification failed".into())
    }
}
