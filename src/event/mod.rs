//! Proxy-integration event model and request translators.
//!
//! # Data Flow
//! ```text
//! axum request parts + peer address
//!     → v1.rs / v2.rs (build the event for the configured format)
//!     → serde_json (serialize with the proxy-integration field names)
//!     → rpc::invoke (hand the payload to the function host)
//!
//! host reply payload
//!     → response.rs (decode / resolve into a ProxyResponseEvent)
//!     → server.rs (write the HTTP response)
//! ```
//!
//! # Design Decisions
//! - Events are built fresh per request and never shared or cached
//! - Bodies that are not printable ASCII travel base64-encoded with the
//!   binary flag set; the same detector drives both formats
//! - Synthetic x-forwarded-* headers are injected after real headers and
//!   win over same-named client headers

pub mod response;
pub mod v1;
pub mod v2;

pub use response::ProxyResponseEvent;
pub use v1::ProxyRequestEvent;
pub use v2::ProxyRequestEventV2;

use axum::http::{header, HeaderMap, Uri};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Trace-id placeholder injected into every event.
pub const TRACE_ID_PLACEHOLDER: &str = "Root=0-00000000-000000000000000000000000";

/// True iff any byte falls outside printable ASCII (0x20..=0x7E).
///
/// Control bytes (including `\n` and `\t`) and all non-ASCII bytes count
/// as binary, so such bodies round-trip base64-encoded.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| !(0x20..=0x7E).contains(&b))
}

/// Encode a request body per the binary detector.
///
/// Returns the body field text and the binary flag.
pub(crate) fn encode_body(bytes: &[u8]) -> (String, bool) {
    if is_binary(bytes) {
        (BASE64.encode(bytes), true)
    } else {
        // printable ASCII is always valid UTF-8
        (String::from_utf8_lossy(bytes).into_owned(), false)
    }
}

/// The request's host value: the Host header, or the URI authority when
/// the header is absent (HTTP/2 promotes it to `:authority`).
pub(crate) fn host_of(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// The percent-decoded request path; the raw path when decoding fails.
pub(crate) fn decoded_path(uri: &Uri) -> String {
    let raw = uri.path();
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}

/// Decoded query key/value pairs in arrival order.
pub(crate) fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}
