//! Typed error hierarchy for the quickbase crate.
//!
//! Two failure classes exist, and they are kept strictly separate:
//!
//! - Transport/codec failures (`Network`, `Http`, `Serialize`,
//!   `Deserialize`) — the request never completed or the body could not be
//!   understood. These are surfaced immediately and never interpreted
//!   further.
//! - Vendor-reported failures (`Vendor`) — the HTTP round trip succeeded
//!   (200 OK) but the response envelope carries a non-zero `errcode`.
//!   QuickBase puts its diagnostic message in `errtext` and a longer,
//!   user-facing explanation in `errdetail`; both are preserved verbatim
//!   because they are often the only clue to a permissions or schema
//!   problem.
//!
//! Variants map to real system boundaries. `Http` keeps the raw response
//! body rather than discarding it the way `error_for_status()` would.

use reqwest::StatusCode;

/// Unified error type for all quickbase library operations.
///
/// The `#[source]`/`#[from]` attributes on inner errors enable
/// `Error::source()` chaining so callers can traverse the full cause chain.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// QuickBase returned a response envelope with a non-zero `errcode`.
    ///
    /// The HTTP exchange itself succeeded; this is the API telling us the
    /// call failed (bad credentials, unknown dbid, invalid query, missing
    /// app token, and so on). Error codes are documented in the QuickBase
    /// API guide.
    #[error("QuickBase error {code}: {text}")]
    Vendor {
        /// Vendor error code from the `<errcode>` element. Zero means
        /// success and never appears here.
        code: u32,
        /// Short message from the `<errtext>` element.
        text: String,
        /// Longer explanation from the `<errdetail>` element, when the API
        /// provides one. Preserved verbatim.
        detail: Option<String>,
    },

    /// The server returned a non-success HTTP status code.
    ///
    /// QuickBase normally reports failures inside the envelope with a 200
    /// status, so this variant indicates something in front of the API
    /// (proxy, gateway, outage) rejected the request. The body is kept for
    /// diagnostics.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// The raw response body text, possibly empty.
        body: String,
    },

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, request timeout, etc.). No HTTP status code is
    /// available because the request did not complete.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Building the XML request body failed.
    #[error("failed to build request XML: {0}")]
    Serialize(#[from] quick_xml::SeError),

    /// The response body was not well-formed XML or did not match the
    /// expected response shape for the action.
    #[error("failed to parse response XML: {0}")]
    Deserialize(#[from] quick_xml::DeError),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
