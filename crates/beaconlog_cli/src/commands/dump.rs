//! Dump command implementation.

use super::read_log;
use beaconlog_codec::decode_for_display;
use std::path::Path;

/// Formats display rows (header first) as aligned text columns.
pub fn format_table(rows: &[Vec<String>], limit: Option<usize>) -> String {
    let take = limit.map_or(rows.len(), |limit| limit.saturating_add(1));
    let rows = &rows[..take.min(rows.len())];

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (column, cell) in row.iter().enumerate() {
            widths[column] = widths[column].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(column, cell)| format!("{cell:<width$}", width = widths[column]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Runs the dump command.
pub fn run(path: &Path, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_log(path)?;
    let rows = decode_for_display(&text);
    print!("{}", format_table(&rows, limit));
    println!(
        "({} of {} records shown)",
        limit.map_or(rows.len().saturating_sub(1), |l| l.min(rows.len().saturating_sub(1))),
        rows.len().saturating_sub(1)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<String>> {
        [["id", "ip"], ["alice", "9.9.9.9"], ["bo", "10.0.0.1"]]
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn aligns_columns() {
        let table = format_table(&rows(), None);
        assert_eq!(table, "id     ip\nalice  9.9.9.9\nbo     10.0.0.1\n");
    }

    #[test]
    fn limit_keeps_header() {
        let table = format_table(&rows(), Some(1));
        assert_eq!(table, "id     ip\nalice  9.9.9.9\n");

        let table = format_table(&rows(), Some(0));
        assert_eq!(table, "id  ip\n");
    }

    #[test]
    fn empty_rows() {
        assert_eq!(format_table(&[], Some(5)), "");
    }
}
