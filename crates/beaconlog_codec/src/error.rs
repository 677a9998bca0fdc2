//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding stored records.
///
/// Encoding never fails; only the strict decoders return these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A quoted field was never closed.
    #[error("unterminated quoted field starting at byte {position}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A double quote appeared where the quoting rule does not allow one.
    #[error("unexpected double quote at byte {position}")]
    StrayQuote {
        /// Byte offset of the offending character.
        position: usize,
    },

    /// The input ended in the middle of a record.
    #[error("record at byte {position} is not terminated by a line feed")]
    MissingTerminator {
        /// Byte offset where the unterminated record starts.
        position: usize,
    },
}
