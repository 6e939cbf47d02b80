//! API_Authenticate: exchanging credentials for a time-limited ticket.
//!
//! Authentication is the one call addressed to the `main` pseudo-database
//! rather than a table. On success QuickBase issues an opaque ticket (valid
//! for `hours`, or the server default when unset) plus the caller's user
//! id. The ticket is embedded in every subsequent request envelope by the
//! connection; this module never caches or refreshes anything.
//!
//! Reference: QuickBase API guide, API_Authenticate.

use serde::{Deserialize, Serialize};

use crate::client::{QuickBase, MAIN_DB};
use crate::envelope::{self, Trailer};
use crate::error::Result;

/// Credentials for [`QuickBase::login`].
#[derive(Debug, Clone)]
pub struct Credentials {
    /// QuickBase user name or e-mail address.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Requested ticket lifetime in hours. `None` uses the server default
    /// (12 hours at the time of writing).
    pub hours: Option<u32>,
    /// Opaque user data echoed back by the server, unused by QuickBase
    /// itself.
    pub udata: Option<String>,
}

impl Credentials {
    /// Credentials with the default ticket lifetime and no user data.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
            hours: None,
            udata: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename = "qdbapi")]
struct AuthenticateRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    udata: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    #[serde(default)]
    action: Option<String>,
    errcode: u32,
    #[serde(default)]
    errtext: String,
    #[serde(default)]
    errdetail: Option<String>,
    #[serde(default)]
    ticket: Option<String>,
    #[serde(default)]
    userid: Option<String>,
}

impl Trailer for AuthenticateResponse {
    fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
    fn error_code(&self) -> u32 {
        self.errcode
    }
    fn error_text(&self) -> &str {
        &self.errtext
    }
    fn error_detail(&self) -> Option<&str> {
        self.errdetail.as_deref()
    }
}

/// A ticket issued by API_Authenticate.
pub(crate) struct IssuedTicket {
    pub(crate) ticket: String,
    pub(crate) user_id: Option<String>,
}

/// Runs API_Authenticate against `/db/main` and returns the issued ticket.
///
/// Called by [`QuickBase::login`] during construction; the connection's
/// session is still a placeholder at that point, which is fine because the
/// authenticate envelope carries credentials instead of a ticket.
pub(crate) async fn authenticate(qb: &QuickBase, credentials: &Credentials) -> Result<IssuedTicket> {
    let request = AuthenticateRequest {
        username: &credentials.username,
        password: &credentials.password,
        hours: credentials.hours,
        udata: credentials.udata.as_deref(),
    };

    let response: AuthenticateResponse =
        qb.send("API_Authenticate", MAIN_DB, &request).await?;
    envelope::check(&response)?;

    // A zero errcode without a ticket violates the API contract; surface
    // it rather than hand the caller an unusable session.
    let ticket = response.ticket.filter(|t| !t.is_empty()).ok_or_else(|| {
        crate::error::Error::Deserialize(<quick_xml::DeError as serde::de::Error>::custom(
            "API_Authenticate reported success without a ticket",
        ))
    })?;

    Ok(IssuedTicket {
        ticket,
        user_id: response.userid,
    })
}
