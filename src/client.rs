//! Connection and transport for the QuickBase XML HTTP API.
//!
//! [`QuickBase`] wraps a `reqwest::Client`, the target base URL, and an
//! immutable [`Session`]. Every API call is one HTTP POST to
//! `{base_url}/db/{dbid}` with the XML request body and a
//! `QUICKBASE-ACTION` header naming the call; the response body is decoded
//! into the action's typed response by the envelope codec.
//!
//! Session lifecycle: the ticket is obtained exactly once, by
//! [`QuickBase::login`], and never mutated afterwards. There is no expiry
//! tracking or re-authentication — when a ticket lapses the API reports it
//! through the response envelope and the caller logs in again, getting a
//! fresh connection. This keeps the connection free of locks and safe to
//! share across tasks by reference.
//!
//! The transport is transparent to vendor errors: a non-zero `errcode`
//! inside a successfully delivered envelope is inspected by the operation
//! modules, not here. Only HTTP/network/codec failures surface from
//! [`QuickBase::send`] directly.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::{authenticate, Credentials};
use crate::envelope;
use crate::error::{Error, Result};

/// Header naming the API action, e.g. `API_DoQuery`.
const ACTION_HEADER: &str = "QUICKBASE-ACTION";

/// Pseudo-dbid used for calls that address the domain rather than a
/// specific table (only API_Authenticate today).
pub(crate) const MAIN_DB: &str = "main";

/// Connect timeout for the QuickBase HTTP client.
/// Covers TCP + TLS handshake only.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout, covering the full round trip. QuickBase calls
/// are small XML documents; a minute is generous even for large query
/// results.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the `reqwest::Client` with explicit timeouts.
fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client for QuickBase")
}

/// Authentication material embedded in every request envelope.
///
/// Immutable once constructed: the ticket comes from a successful
/// API_Authenticate call and the app token is the optional per-application
/// credential some databases are configured to demand.
#[derive(Debug, Clone)]
pub struct Session {
    ticket: String,
    app_token: Option<String>,
}

impl Session {
    /// Creates a session from an already-acquired ticket.
    ///
    /// Normal callers get a session implicitly through [`QuickBase::login`];
    /// this constructor exists for tests and for callers that persist
    /// tickets out of band.
    pub fn new(ticket: impl Into<String>, app_token: Option<String>) -> Self {
        Session {
            ticket: ticket.into(),
            app_token,
        }
    }

    /// The authentication ticket.
    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    /// The application token, when one is configured.
    pub fn app_token(&self) -> Option<&str> {
        self.app_token.as_deref()
    }
}

/// An authenticated connection to a QuickBase domain.
#[derive(Debug)]
pub struct QuickBase {
    client: Client,
    base_url: String,
    session: Session,
    user_id: Option<String>,
}

impl QuickBase {
    /// Authenticates against `https://{domain}` and returns a connection
    /// holding the issued ticket.
    ///
    /// `credentials.hours` bounds the ticket lifetime server-side; pass
    /// `None` for the QuickBase default. `app_token` is required by
    /// databases configured to demand one and is embedded in every
    /// subsequent request.
    ///
    /// # Errors
    ///
    /// - [`Error::Vendor`] — bad credentials or any other non-zero
    ///   `errcode` from API_Authenticate, with the vendor's detail string
    ///   preserved verbatim.
    /// - [`Error::Network`] / [`Error::Http`] — the token round trip failed
    ///   at the transport level.
    pub async fn login(
        domain: &str,
        credentials: &Credentials,
        app_token: Option<&str>,
    ) -> Result<Self> {
        Self::login_at(&format!("https://{domain}"), credentials, app_token).await
    }

    /// [`login`](Self::login) against an explicit base URL.
    ///
    /// Used by tests to point at a local mock server instead of the real
    /// QuickBase domain.
    pub async fn login_at(
        base_url: &str,
        credentials: &Credentials,
        app_token: Option<&str>,
    ) -> Result<Self> {
        let mut qb = QuickBase {
            client: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            // Placeholder session for the authenticate call itself; the
            // API_Authenticate envelope carries credentials, not a ticket.
            session: Session::new("", app_token.map(str::to_owned)),
            user_id: None,
        };
        let issued = authenticate(&qb, credentials).await?;
        qb.session = Session::new(issued.ticket, app_token.map(str::to_owned));
        qb.user_id = issued.user_id;
        Ok(qb)
    }

    /// Creates a connection from an existing session without
    /// authenticating.
    pub fn with_session(base_url: &str, session: Session) -> Self {
        QuickBase {
            client: build_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            user_id: None,
        }
    }

    /// The session whose ticket and app token are embedded in every
    /// request.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The QuickBase user id returned by API_Authenticate, when this
    /// connection was created via [`login`](Self::login).
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Sends one API call: serialize, POST, decode.
    ///
    /// `dbid` selects the target table ([`MAIN_DB`] for domain-level
    /// calls). The response envelope's `errcode` is NOT inspected here —
    /// callers run `envelope::check` once they hold the typed response.
    pub(crate) async fn send<Req, Resp>(
        &self,
        action: &str,
        dbid: &str,
        request: &Req,
    ) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = envelope::to_request_xml(request)?;
        let url = format!("{}/db/{}", self.base_url, dbid);
        debug!(action, dbid, "sending QuickBase request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/xml")
            .header(ACTION_HEADER, action)
            .body(body)
            .send()
            .await?;

        // Read the body before acting on the status so diagnostics are
        // never discarded.
        let status = response.status();
        let text = response.text().await?;
        debug!(action, status = %status, "received QuickBase response");

        if !status.is_success() {
            return Err(Error::Http { status, body: text });
        }
        envelope::from_response_xml(&text)
    }
}
