//! Record encoding.

use crate::observation::ClientObservation;
use std::borrow::Cow;

/// Characters that force a field to be quoted.
const NEEDS_QUOTING: &[char] = &[',', '"', '\r', '\n'];

/// Escapes a single field.
///
/// Values containing a comma, double quote, carriage return or line feed
/// are wrapped in double quotes with every inner quote doubled. Other
/// values are borrowed unchanged.
///
/// ```
/// use beaconlog_codec::encode_field;
///
/// assert_eq!(encode_field("plain"), "plain");
/// assert_eq!(encode_field("a,b"), "\"a,b\"");
/// assert_eq!(encode_field("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn encode_field(value: &str) -> Cow<'_, str> {
    if !value.contains(NEEDS_QUOTING) {
        return Cow::Borrowed(value);
    }

    let quotes = value.matches('"').count();
    let mut out = String::with_capacity(value.len() + quotes + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    Cow::Owned(out)
}

/// Escapes a field that may be absent. `None` becomes an empty field.
pub fn encode_optional_field(value: Option<&str>) -> Cow<'_, str> {
    value.map_or(Cow::Borrowed(""), encode_field)
}

/// Encodes an observation as one line-feed terminated record.
///
/// Fields are emitted in header order: timestamp, participant id, remote
/// address, forwarding header, resolved ip, user agent, accept-language,
/// referer. This never fails.
pub fn encode(observation: &ClientObservation) -> String {
    let timestamp = observation.timestamp_string();
    let fields = [
        timestamp.as_str(),
        observation.participant_id.as_str(),
        observation.remote_addr.as_str(),
        observation.forwarded_for.as_str(),
        observation.resolved_ip.as_str(),
        observation.user_agent.as_str(),
        observation.accept_language.as_str(),
        observation.referer.as_str(),
    ];

    let mut line = String::with_capacity(fields.iter().map(|f| f.len() + 1).sum::<usize>() + 16);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&encode_field(field));
    }
    line.push('\n');
    line
}
