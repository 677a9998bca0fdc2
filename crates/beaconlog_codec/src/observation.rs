//! Client observations and network identity resolution.

use chrono::{DateTime, SecondsFormat, Utc};

/// Remote address recorded when the connection peer is not known.
pub const UNKNOWN_ADDR: &str = "unknown";

/// What the serving layer extracts from one beacon fetch.
///
/// Every field except the participant id is optional; absent headers are
/// recorded as empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconRequest {
    /// Caller-supplied participant token (untrusted).
    pub participant_id: String,
    /// Transport-level peer address.
    pub remote_addr: Option<String>,
    /// Raw `X-Forwarded-For` header.
    pub forwarded_for: Option<String>,
    /// Raw `User-Agent` header.
    pub user_agent: Option<String>,
    /// Raw `Accept-Language` header.
    pub accept_language: Option<String>,
    /// Raw `Referer` header.
    pub referer: Option<String>,
}

impl BeaconRequest {
    /// Creates a request for the given participant with no other signals.
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            ..Self::default()
        }
    }

    /// Sets the peer address.
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Sets the forwarding header.
    pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
        self.forwarded_for = Some(value.into());
        self
    }

    /// Sets the user agent header.
    pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// Sets the accept-language header.
    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    /// Sets the referer header.
    pub fn with_referer(mut self, value: impl Into<String>) -> Self {
        self.referer = Some(value.into());
        self
    }
}

/// Picks the address considered authoritative for a request.
///
/// The first comma-separated token of `forwarded_for`, trimmed, wins when it
/// is non-empty. Otherwise `remote_addr` is used.
///
/// ```
/// use beaconlog_codec::resolve_ip;
///
/// assert_eq!(resolve_ip("1.2.3.4, 5.6.7.8", "9.9.9.9"), "1.2.3.4");
/// assert_eq!(resolve_ip("", "9.9.9.9"), "9.9.9.9");
/// assert_eq!(resolve_ip(" , 5.6.7.8", "9.9.9.9"), "9.9.9.9");
/// ```
pub fn resolve_ip<'a>(forwarded_for: &'a str, remote_addr: &'a str) -> &'a str {
    match forwarded_for.split(',').next().map(str::trim) {
        Some(first) if !first.is_empty() => first,
        _ => remote_addr,
    }
}

/// One beacon fetch, normalized and ready to be encoded.
///
/// Constructed per request and consumed immediately by the log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientObservation {
    /// When the fetch was observed. Never caller-supplied.
    pub timestamp: DateTime<Utc>,
    /// Participant token, verbatim.
    pub participant_id: String,
    /// Peer address, or [`UNKNOWN_ADDR`].
    pub remote_addr: String,
    /// Raw forwarding header, empty if absent.
    pub forwarded_for: String,
    /// Authoritative address; never empty.
    pub resolved_ip: String,
    /// User agent, empty if absent.
    pub user_agent: String,
    /// Accept-Language, empty if absent.
    pub accept_language: String,
    /// Referer, empty if absent.
    pub referer: String,
}

impl ClientObservation {
    /// Captures an observation of `request` at the current instant.
    pub fn capture(request: &BeaconRequest) -> Self {
        Self::at(request, Utc::now())
    }

    /// Captures an observation of `request` at a fixed instant.
    pub fn at(request: &BeaconRequest, timestamp: DateTime<Utc>) -> Self {
        let remote_addr = request
            .remote_addr
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .unwrap_or(UNKNOWN_ADDR)
            .to_string();
        let forwarded_for = request.forwarded_for.clone().unwrap_or_default();
        let resolved_ip = resolve_ip(&forwarded_for, &remote_addr).to_string();

        Self {
            timestamp,
            participant_id: request.participant_id.clone(),
            remote_addr,
            forwarded_for,
            resolved_ip,
            user_agent: request.user_agent.clone().unwrap_or_default(),
            accept_language: request.accept_language.clone().unwrap_or_default(),
            referer: request.referer.clone().unwrap_or_default(),
        }
    }

    /// ISO-8601 UTC timestamp with millisecond precision, e.g.
    /// `2025-03-01T09:30:00.000Z`.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn resolves_first_forwarded_address() {
        let request = BeaconRequest::new("p1")
            .with_remote_addr("9.9.9.9")
            .with_forwarded_for("1.2.3.4, 5.6.7.8");

        let observation = ClientObservation::at(&request, fixed_time());
        assert_eq!(observation.resolved_ip, "1.2.3.4");
        assert_eq!(observation.forwarded_for, "1.2.3.4, 5.6.7.8");
        assert_eq!(observation.remote_addr, "9.9.9.9");
    }

    #[test]
    fn falls_back_to_remote_addr() {
        let absent = BeaconRequest::new("p1").with_remote_addr("9.9.9.9");
        let empty = absent.clone().with_forwarded_for("");
        let blank = absent.clone().with_forwarded_for("   ,10.0.0.1");

        for request in [absent, empty, blank] {
            let observation = ClientObservation::at(&request, fixed_time());
            assert_eq!(observation.resolved_ip, "9.9.9.9");
        }
    }

    #[test]
    fn missing_remote_addr_is_unknown() {
        let request = BeaconRequest::new("p1");
        let observation = ClientObservation::at(&request, fixed_time());
        assert_eq!(observation.remote_addr, UNKNOWN_ADDR);
        assert_eq!(observation.resolved_ip, UNKNOWN_ADDR);

        let empty = BeaconRequest::new("p1").with_remote_addr("");
        let observation = ClientObservation::at(&empty, fixed_time());
        assert_eq!(observation.resolved_ip, UNKNOWN_ADDR);
    }

    #[test]
    fn forwarded_token_is_trimmed() {
        assert_eq!(resolve_ip("  1.2.3.4  ,5.6.7.8", "9.9.9.9"), "1.2.3.4");
        assert_eq!(resolve_ip("2001:db8::1", "9.9.9.9"), "2001:db8::1");
    }

    #[test]
    fn absent_headers_are_empty() {
        let request = BeaconRequest::new("p1").with_remote_addr("9.9.9.9");
        let observation = ClientObservation::at(&request, fixed_time());
        assert!(observation.forwarded_for.is_empty());
        assert!(observation.user_agent.is_empty());
        assert!(observation.accept_language.is_empty());
        assert!(observation.referer.is_empty());
    }

    #[test]
    fn timestamp_format() {
        let request = BeaconRequest::new("p1");
        let observation = ClientObservation::at(&request, fixed_time());
        assert_eq!(observation.timestamp_string(), "2025-03-01T09:30:00.000Z");
    }
}
