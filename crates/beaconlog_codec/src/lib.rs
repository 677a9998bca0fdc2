//! # Beaconlog Codec
//!
//! Client observation model and record codec for beaconlog.
//!
//! Every beacon fetch becomes one [`ClientObservation`], which is encoded
//! into a single line of eight comma-separated fields. Participant ids and
//! headers are attacker-controlled, so each field is escaped independently:
//!
//! - Values containing `,`, `"`, `\r` or `\n` are wrapped in double quotes
//!   and every inner `"` is doubled
//! - Everything else is emitted verbatim
//! - A missing value is an empty field
//!
//! Encoding is total and never fails. [`decode_field`] and
//! [`decode_records`] are its strict inverse. [`decode_for_display`] is a
//! lossy, cosmetic view used by the HTML data page.
//!
//! ## Usage
//!
//! ```
//! use beaconlog_codec::{encode, decode_records, BeaconRequest, ClientObservation};
//!
//! let request = BeaconRequest::new("p-42")
//!     .with_remote_addr("9.9.9.9")
//!     .with_user_agent("Mozilla/5.0 (X11, Linux)");
//! let observation = ClientObservation::capture(&request);
//!
//! let line = encode(&observation);
//! let records = decode_records(&line).unwrap();
//! assert_eq!(records[0][1], "p-42");
//! assert_eq!(records[0][5], "Mozilla/5.0 (X11, Linux)");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod observation;

pub use decoder::{decode_field, decode_for_display, decode_records};
pub use encoder::{encode, encode_field, encode_optional_field};
pub use error::{CodecError, CodecResult};
pub use observation::{resolve_ip, BeaconRequest, ClientObservation, UNKNOWN_ADDR};

/// Number of fields in every record.
pub const FIELD_COUNT: usize = 8;

/// Column names, in record order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "timestamp",
    "participant_id",
    "remote_addr",
    "x_forwarded_for",
    "ip_used",
    "user_agent",
    "accept_language",
    "referer",
];

/// The first line of every log, including its terminator.
pub const HEADER_LINE: &str =
    "timestamp,participant_id,remote_addr,x_forwarded_for,ip_used,user_agent,accept_language,referer\n";
