//! API_AddRecord and API_EditRecord: writing records to a table.
//!
//! Both calls send the record's fields as `<field fid="N">value</field>`
//! elements. AddRecord creates a row and returns its new record id;
//! EditRecord targets an existing row — by record id or by the table's key
//! field, expressed as [`RecordKey`] — and returns how many fields actually
//! changed. Both return the row's new update id, the optimistic-concurrency
//! token that changes on every edit.
//!
//! Reference: QuickBase API guide, API_AddRecord / API_EditRecord.

use serde::{Deserialize, Serialize};

use crate::client::QuickBase;
use crate::envelope::{self, Trailer};
use crate::error::Result;
use crate::record::{Record, RecordKey, WireField};

/// Result of a successful [`add_record`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The server-assigned id of the newly created record.
    pub record_id: u32,
    /// The record's initial optimistic-concurrency token.
    pub update_id: u64,
}

/// Result of a successful [`edit_record`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// How many fields the server actually changed. Fields submitted with
    /// their current value do not count.
    pub num_fields_changed: u32,
    /// The record's new optimistic-concurrency token.
    pub update_id: u64,
}

#[derive(Serialize)]
#[serde(rename = "qdbapi")]
struct AddRecordRequest<'a> {
    field: Vec<WireField>,
    ticket: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    apptoken: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename = "qdbapi")]
struct EditRecordRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    rid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    field: Vec<WireField>,
    ticket: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    apptoken: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AddRecordResponse {
    #[serde(default)]
    action: Option<String>,
    errcode: u32,
    #[serde(default)]
    errtext: String,
    #[serde(default)]
    errdetail: Option<String>,
    #[serde(default)]
    rid: Option<u32>,
    #[serde(default)]
    update_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EditRecordResponse {
    #[serde(default)]
    action: Option<String>,
    errcode: u32,
    #[serde(default)]
    errtext: String,
    #[serde(default)]
    errdetail: Option<String>,
    #[serde(default)]
    num_fields_changed: Option<u32>,
    #[serde(default)]
    update_id: Option<u64>,
}

impl Trailer for AddRecordResponse {
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

impl Trailer for EditRecordResponse {
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

/// Adds a new record to the table `dbid`.
///
/// Only the record's fields travel on the wire; any record id or update id
/// on `record` is ignored (identity is assigned by the server).
///
/// # Errors
///
/// - [`Error::Vendor`](crate::Error::Vendor) — non-zero `errcode`, e.g. a
///   missing required field or a value the field type rejects.
/// - Transport/codec errors per [`crate::Error`].
pub async fn add_record(qb: &QuickBase, dbid: &str, record: &Record) -> Result<AddOutcome> {
    let request = AddRecordRequest {
        field: record.wire_fields(),
        ticket: qb.session().ticket(),
        apptoken: qb.session().app_token(),
    };

    let response: AddRecordResponse = qb.send("API_AddRecord", dbid, &request).await?;
    envelope::check(&response)?;

    Ok(AddOutcome {
        record_id: response.rid.unwrap_or_default(),
        update_id: response.update_id.unwrap_or_default(),
    })
}

/// Edits the record identified by `key` in the table `dbid`.
///
/// Exactly the fields present on `record` are submitted; everything else on
/// the row is left untouched. The [`RecordKey`] variant decides whether
/// `<rid>` or `<key>` appears on the wire — the two are mutually exclusive
/// by construction.
///
/// # Errors
///
/// - [`Error::Vendor`](crate::Error::Vendor) — non-zero `errcode`, e.g. an
///   unknown record id (code 30) or an uneditable field.
/// - Transport/codec errors per [`crate::Error`].
pub async fn edit_record(
    qb: &QuickBase,
    dbid: &str,
    key: &RecordKey,
    record: &Record,
) -> Result<EditOutcome> {
    let (rid, lookup) = match key {
        RecordKey::Rid(rid) => (Some(*rid), None),
        RecordKey::Key(value) => (None, Some(value.as_str())),
    };
    let request = EditRecordRequest {
        rid,
        key: lookup,
        field: record.wire_fields(),
        ticket: qb.session().ticket(),
        apptoken: qb.session().app_token(),
    };

    let response: EditRecordResponse = qb.send("API_EditRecord", dbid, &request).await?;
    envelope::check(&response)?;

    Ok(EditOutcome {
        num_fields_changed: response.num_fields_changed.unwrap_or_default(),
        update_id: response.update_id.unwrap_or_default(),
    })
}
