//! Async Rust client library for the QuickBase XML HTTP API.
//!
//! Implements the four core calls — API_Authenticate, API_AddRecord,
//! API_EditRecord, API_DoQuery — as one HTTP POST each to
//! `https://{domain}/db/{dbid}`, with XML request/response bodies and a
//! `QUICKBASE-ACTION` header naming the call.
//!
//! # Modules
//!
//! - [`auth`] — credentials and the API_Authenticate login flow.
//! - [`client`] — the authenticated connection and its one-POST transport.
//! - `envelope` (internal) — shared XML envelope codec and vendor-error
//!   trailer check.
//! - [`error`] — typed error hierarchy ([`Error`]) for all operations.
//! - [`record`] — the field-id-keyed record model and wire normalization.
//! - [`records`] — API_AddRecord / API_EditRecord.
//! - [`query`] — API_DoQuery and its saved-query variants.
//!
//! # Quick start
//!
//! ```ignore
//! use quickbase::auth::Credentials;
//! use quickbase::client::QuickBase;
//! use quickbase::query::{do_query, QueryOptions, QuerySelector};
//! use quickbase::record::Record;
//! use quickbase::records::add_record;
//!
//! let qb = QuickBase::login(
//!     "acme.quickbase.com",
//!     &Credentials::new("user@example.com", "hunter2"),
//!     None,
//! )
//! .await?;
//!
//! let mut record = Record::new();
//! record.set(6, "widget");
//! let outcome = add_record(&qb, "bdb5rjd6h", &record).await?;
//!
//! let result = do_query(
//!     &qb,
//!     "bdb5rjd6h",
//!     &QuerySelector::Raw("{'7'.EX.'blue'}".to_string()),
//!     &QueryOptions::default(),
//! )
//! .await?;
//! for record in &result.records {
//!     println!("{:?}", record.labeled());
//! }
//! ```
//!
//! Reference: QuickBase API guide,
//! <https://www.quickbase.com/api-guide/index.html>.

#![warn(missing_docs)]

pub mod auth;
pub mod client;
mod envelope;
pub mod error;
pub mod query;
pub mod record;
pub mod records;

pub use error::{Error, Result};
