//! HTML view of the log.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

const STYLE: &str = "\
    body { font-family: Arial, sans-serif; margin: 20px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
    .timestamp { white-space: nowrap; }
    .participant { font-weight: bold; }";

/// Renders display rows (header first) as a standalone HTML page.
///
/// `download_href` is the link target for the raw download. Cell text is
/// HTML-escaped; the rows themselves come from
/// [`beaconlog_codec::decode_for_display`] and are shown as they are.
pub fn render_data_page(
    rows: &[Vec<String>],
    download_href: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let entries = rows.len().saturating_sub(1);
    let mut html = String::with_capacity(1024 + rows.len() * 256);

    // Writing to a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n  <title>Tracking Data</title>\n  <style>\n{STYLE}\n  </style>\n</head>\n<body>\n  <h1>Tracking Data ({entries} entries)</h1>\n  <p><a href=\"{}\">Download CSV</a></p>\n  <table>\n",
        escape_html(download_href)
    );

    for (index, row) in rows.iter().enumerate() {
        let tag = if index == 0 { "th" } else { "td" };
        html.push_str("<tr>");
        for (column, cell) in row.iter().enumerate() {
            let class = match column {
                0 => "timestamp",
                1 => "participant",
                _ => "",
            };
            let _ = write!(html, "<{tag} class=\"{class}\">{}</{tag}>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }

    let _ = write!(
        html,
        "  </table>\n  <p>Last updated: {}</p>\n</body>\n</html>",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    html
}

/// Escapes text for HTML element content and double-quoted attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes a single path segment.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beaconlog_codec::{decode_for_display, HEADER_LINE};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn renders_header_and_rows() {
        let text = format!("{HEADER_LINE}2025-03-01T09:00:00.000Z,p1,9.9.9.9,,9.9.9.9,ua,en,\n");
        let rows = decode_for_display(&text);
        let html = render_data_page(&rows, "/download-data/key", fixed_time());

        assert!(html.contains("<h1>Tracking Data (1 entries)</h1>"));
        assert!(html.contains("<th class=\"timestamp\">timestamp</th>"));
        assert!(html.contains("<th class=\"participant\">participant_id</th>"));
        assert!(html.contains("<td class=\"participant\">p1</td>"));
        assert!(html.contains("<td class=\"\">9.9.9.9</td>"));
        assert!(html.contains("href=\"/download-data/key\""));
        assert!(html.contains("Last updated: 2025-03-01T09:30:00.000Z"));
    }

    #[test]
    fn escapes_cell_markup() {
        let rows = vec![
            vec!["h".to_string()],
            vec!["<script>alert('x')</script>".to_string()],
        ];
        let html = render_data_page(&rows, "/d", fixed_time());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn empty_rows() {
        let html = render_data_page(&[], "/d", fixed_time());
        assert!(html.contains("(0 entries)"));
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("abc-123_~."), "abc-123_~.");
        assert_eq!(encode_path_segment("a b/c?"), "a%20b%2Fc%3F");
        assert_eq!(encode_path_segment("é"), "%C3%A9");
    }
}
