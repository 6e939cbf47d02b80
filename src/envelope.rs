//! XML envelope codec shared by every QuickBase API call.
//!
//! Every request and response body is a `<qdbapi>` document. Requests carry
//! the session ticket and optional app token as child elements; responses
//! carry a common trailer (`action`, `errcode`, `errtext`, `errdetail`)
//! alongside the action-specific payload. This module owns the two codec
//! directions plus the trailer inspection:
//!
//! - [`to_request_xml`] — serialize a request struct, then normalize the
//!   apostrophe entity (see below).
//! - [`from_response_xml`] — deserialize a response struct.
//! - [`Trailer`] / [`check`] — read the shared trailer fields and convert a
//!   non-zero `errcode` into [`Error::Vendor`].
//!
//! ## Apostrophe escaping
//!
//! QuickBase's receiving parser rejects the numeric character reference
//! `&#39;` that some XML serializers emit for `'`, while accepting the named
//! entity `&apos;`. [`to_request_xml`] rewrites any `&#39;` to `&apos;`
//! before transmission so a value like `O'Hare` survives the round trip
//! unmangled.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Serializes a request struct into a `<qdbapi>` document ready to POST.
///
/// The struct's serde attributes decide the element layout; this function
/// only adds the apostrophe-entity rewrite on top of quick-xml's output.
pub(crate) fn to_request_xml<T: Serialize>(request: &T) -> Result<String> {
    let body = quick_xml::se::to_string(request)?;
    // quick-xml may emit `'` either literally or as an entity depending on
    // the escape mode; only the numeric form needs correcting.
    Ok(body.replace("&#39;", "&apos;"))
}

/// Deserializes a raw response body into the typed response for an action.
pub(crate) fn from_response_xml<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(quick_xml::de::from_str(body)?)
}

/// Shared trailer fields present on every QuickBase response envelope.
///
/// Each typed response struct carries these four elements and implements
/// this trait so operations can run the common error inspection without
/// knowing the concrete response shape.
pub(crate) trait Trailer {
    /// The `<action>` element echoing the API call name.
    fn action(&self) -> Option<&str>;
    /// The `<errcode>` element. Zero means success.
    fn error_code(&self) -> u32;
    /// The `<errtext>` element, a short vendor message.
    fn error_text(&self) -> &str;
    /// The `<errdetail>` element, when present.
    fn error_detail(&self) -> Option<&str>;
}

/// Converts a non-zero envelope `errcode` into [`Error::Vendor`].
///
/// Transport never calls this; it is the operation's job to decide when the
/// envelope has been received intact and the vendor verdict applies.
pub(crate) fn check<T: Trailer>(response: &T) -> Result<()> {
    match response.error_code() {
        0 => Ok(()),
        code => {
            debug!(
                action = ?response.action(),
                code,
                "response envelope reported a vendor error"
            );
            Err(Error::Vendor {
                code,
                text: response.error_text().to_string(),
                detail: response.error_detail().map(str::to_owned),
            })
        }
    }
}
