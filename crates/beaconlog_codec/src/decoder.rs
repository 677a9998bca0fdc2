//! Record decoding.
//!
//! Two decoders live here:
//!
//! - [`decode_field`] and [`decode_records`] are the strict inverse of the
//!   encoder. They reject anything the encoder could not have produced.
//! - [`decode_for_display`] is a best-effort view for humans. It splits on
//!   every comma and strips one surrounding quote from each piece, so values
//!   that contain commas, line breaks or doubled quotes render lossily. The
//!   raw download path never goes through it.

use crate::error::{CodecError, CodecResult};

/// Decodes a single escaped field back into its original value.
///
/// # Errors
///
/// Returns an error if the field is not something [`crate::encode_field`]
/// produces: an unclosed quote, or a quote that is neither the outer pair
/// nor part of a doubled `""`.
pub fn decode_field(field: &str) -> CodecResult<String> {
    let Some(quoted) = field.strip_prefix('"') else {
        if let Some(position) = field.find('"') {
            return Err(CodecError::StrayQuote { position });
        }
        return Ok(field.to_string());
    };

    let inner = quoted
        .strip_suffix('"')
        .ok_or(CodecError::UnterminatedQuote { position: 0 })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((index, ch)) = chars.next() {
        if ch == '"' {
            match chars.next() {
                Some((_, '"')) => {}
                _ => return Err(CodecError::StrayQuote { position: index + 1 }),
            }
        }
        out.push(ch);
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted { opened_at: usize },
    QuoteInQuoted { opened_at: usize },
}

/// Parses a whole log into records of decoded fields.
///
/// Quoted fields may contain commas and line breaks, so one record can span
/// several physical lines. Every record, including the last, must end with a
/// line feed. The header line is returned as the first record.
///
/// # Errors
///
/// Returns an error on an unclosed quote, a misplaced quote, or a final
/// record without its line feed.
pub fn decode_records(text: &str) -> CodecResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut record_start = 0;
    let mut state = State::FieldStart;

    for (position, ch) in text.char_indices() {
        state = match (state, ch) {
            (State::FieldStart, '"') => State::Quoted {
                opened_at: position,
            },
            (State::FieldStart | State::Unquoted | State::QuoteInQuoted { .. }, ',') => {
                record.push(std::mem::take(&mut field));
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted | State::QuoteInQuoted { .. }, '\n') => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                record_start = position + 1;
                State::FieldStart
            }
            (State::Unquoted, '"') => return Err(CodecError::StrayQuote { position }),
            (State::FieldStart | State::Unquoted, _) => {
                field.push(ch);
                State::Unquoted
            }
            (State::Quoted { opened_at }, '"') => State::QuoteInQuoted { opened_at },
            (State::Quoted { opened_at }, _) => {
                field.push(ch);
                State::Quoted { opened_at }
            }
            (State::QuoteInQuoted { opened_at }, '"') => {
                field.push('"');
                State::Quoted { opened_at }
            }
            (State::QuoteInQuoted { .. }, _) => {
                return Err(CodecError::StrayQuote {
                    position: position - 1,
                });
            }
        };
    }

    match state {
        State::Quoted { opened_at } => Err(CodecError::UnterminatedQuote {
            position: opened_at,
        }),
        State::FieldStart if record.is_empty() => Ok(records),
        _ => Err(CodecError::MissingTerminator {
            position: record_start,
        }),
    }
}

/// Builds a cosmetic table from the stored log text.
///
/// The text is trimmed, split on line feeds, and blank lines are skipped.
/// Each line is split on every comma and one leading and one trailing double
/// quote is stripped from each piece. Row 0 is the header.
///
/// This is not an inverse of the encoder: internal doubled quotes are left
/// doubled, and quoted commas or line breaks split cells.
pub fn decode_for_display(text: &str) -> Vec<Vec<String>> {
    text.trim()
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(strip_display_quotes).collect())
        .collect()
}

fn strip_display_quotes(cell: &str) -> String {
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    let cell = cell.strip_suffix('"').unwrap_or(cell);
    cell.to_string()
}
