//! API_DoQuery: reading records from a table.
//!
//! A query is driven by exactly one selector — a raw query string, a saved
//! query name, or a saved query id — expressed as [`QuerySelector`] so the
//! mutual exclusivity is settled in the type system rather than by
//! precedence rules at serialization time. Column and sort lists, the
//! options string, and the percentage-format flag ride along in
//! [`QueryOptions`].
//!
//! Two wire defaults are forced regardless of caller input: `fmt` is always
//! `structured` (the only shape this crate decodes) and `includeRids` is
//! always set so every returned row carries its record id. Everything the
//! caller supplies explicitly is sent as-is.
//!
//! The response's field-definition block becomes the field-id→label
//! dictionary of [`QueryResult`], and each decoded [`Record`] is annotated
//! with labels from that dictionary.
//!
//! Reference: QuickBase API guide, API_DoQuery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::QuickBase;
use crate::envelope::{self, Trailer};
use crate::error::Result;
use crate::record::{ReadField, Record};

/// Selects which records a query returns. Exactly one form per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySelector {
    /// A raw query string, e.g. `{'7'.EX.'blue'}`.
    Raw(String),
    /// The name of a saved query defined on the table.
    Name(String),
    /// The id of a saved query defined on the table.
    Id(u32),
}

/// Optional query parameters. All default to unset; values the caller
/// supplies are transmitted unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Period-separated list of field ids to return (`clist`). Unset means
    /// the table's default columns.
    pub column_list: Option<String>,
    /// Period-separated list of field ids to sort by (`slist`).
    pub sort_list: Option<String>,
    /// QuickBase options string, e.g. `num-10.sortorder-D`.
    pub options: Option<String>,
    /// When set, numeric percent fields are returned as fractions of 1
    /// rather than whole percentages.
    pub return_percentage: bool,
    /// Opaque user data echoed back by the server.
    pub udata: Option<String>,
}

/// An ordered query result: the label dictionary plus the decoded records.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Field-id→label dictionary from the response's field-definition
    /// block. Covers every column present in the result.
    pub labels: BTreeMap<u32, String>,
    /// The records, in the order the server returned them, each annotated
    /// with labels from the dictionary.
    pub records: Vec<Record>,
}

#[derive(Serialize)]
#[serde(rename = "qdbapi")]
struct DoQueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clist: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slist: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    returnpercentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    udata: Option<&'a str>,
    ticket: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    apptoken: Option<&'a str>,
    fmt: &'static str,
    #[serde(rename = "includeRids")]
    include_rids: u8,
}

#[derive(Debug, Deserialize)]
struct DoQueryResponse {
    #[serde(default)]
    action: Option<String>,
    errcode: u32,
    #[serde(default)]
    errtext: String,
    #[serde(default)]
    errdetail: Option<String>,
    #[serde(default)]
    table: Option<WireTable>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTable {
    #[serde(default)]
    fields: WireFieldDefs,
    #[serde(default)]
    records: WireRecords,
}

#[derive(Debug, Default, Deserialize)]
struct WireFieldDefs {
    #[serde(default, rename = "field")]
    field: Vec<WireFieldDef>,
}

#[derive(Debug, Deserialize)]
struct WireFieldDef {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireRecords {
    #[serde(default, rename = "record")]
    record: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default, rename = "@rid")]
    rid: Option<u32>,
    #[serde(default)]
    update_id: Option<u64>,
    #[serde(default, rename = "f")]
    fields: Vec<ReadField>,
}

impl Trailer for DoQueryResponse {
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

impl DoQueryResponse {
    /// Maps the wire table into the public result shape, annotating every
    /// record's fields via the label dictionary.
    fn into_result(self) -> QueryResult {
        let table = self.table.unwrap_or_default();
        let labels: BTreeMap<u32, String> = table
            .fields
            .field
            .into_iter()
            .map(|f| (f.id, f.label))
            .collect();
        let records = table
            .records
            .record
            .into_iter()
            .map(|r| Record::from_wire(r.rid, r.update_id, r.fields, &labels))
            .collect();
        QueryResult { labels, records }
    }
}

/// Runs a query against the table `dbid`.
///
/// # Errors
///
/// - [`Error::Vendor`](crate::Error::Vendor) — non-zero `errcode`, e.g. a
///   malformed query string or an unknown saved query.
/// - Transport/codec errors per [`crate::Error`].
pub async fn do_query(
    qb: &QuickBase,
    dbid: &str,
    selector: &QuerySelector,
    options: &QueryOptions,
) -> Result<QueryResult> {
    let (query, qname, qid) = match selector {
        QuerySelector::Raw(q) => (Some(q.as_str()), None, None),
        QuerySelector::Name(name) => (None, Some(name.as_str()), None),
        QuerySelector::Id(id) => (None, None, Some(*id)),
    };
    let request = DoQueryRequest {
        query,
        qname,
        qid,
        clist: options.column_list.as_deref(),
        slist: options.sort_list.as_deref(),
        options: options.options.as_deref(),
        returnpercentage: options.return_percentage.then_some(1),
        udata: options.udata.as_deref(),
        ticket: qb.session().ticket(),
        apptoken: qb.session().app_token(),
        // Forced wire defaults: this crate only decodes the structured
        // shape, and record ids are always requested.
        fmt: "structured",
        include_rids: 1,
    };

    let response: DoQueryResponse = qb.send("API_DoQuery", dbid, &request).await?;
    envelope::check(&response)?;
    Ok(response.into_result())
}

/// Runs a saved query by name. Shorthand for [`do_query`] with
/// [`QuerySelector::Name`].
pub async fn do_query_by_name(
    qb: &QuickBase,
    dbid: &str,
    name: &str,
    options: &QueryOptions,
) -> Result<QueryResult> {
    do_query(qb, dbid, &QuerySelector::Name(name.to_string()), options).await
}

/// Runs a saved query by id. Shorthand for [`do_query`] with
/// [`QuerySelector::Id`].
pub async fn do_query_by_id(
    qb: &QuickBase,
    dbid: &str,
    qid: u32,
    options: &QueryOptions,
) -> Result<QueryResult> {
    do_query(qb, dbid, &QuerySelector::Id(qid), options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{check, from_response_xml, to_request_xml};
    use crate::error::Error;

    fn request_for(selector: &QuerySelector, options: &QueryOptions) -> String {
        let (query, qname, qid) = match selector {
            QuerySelector::Raw(q) => (Some(q.as_str()), None, None),
            QuerySelector::Name(name) => (None, Some(name.as_str()), None),
            QuerySelector::Id(id) => (None, None, Some(*id)),
        };
        let request = DoQueryRequest {
            query,
            qname,
            qid,
            clist: options.column_list.as_deref(),
            slist: options.sort_list.as_deref(),
            options: options.options.as_deref(),
            returnpercentage: options.return_percentage.then_some(1),
            udata: options.udata.as_deref(),
            ticket: "2_ticket",
            apptoken: None,
            fmt: "structured",
            include_rids: 1,
        };
        to_request_xml(&request).unwrap()
    }

    #[test]
    fn raw_selector_puts_only_query_on_the_wire() {
        let xml = request_for(
            &QuerySelector::Raw("{'7'.EX.'blue'}".to_string()),
            &QueryOptions::default(),
        );
        assert!(xml.contains("<query>"), "{xml}");
        assert!(!xml.contains("<qname>"), "qname must be absent: {xml}");
        assert!(!xml.contains("<qid>"), "qid must be absent: {xml}");
    }

    #[test]
    fn name_selector_puts_only_qname_on_the_wire() {
        let xml = request_for(
            &QuerySelector::Name("Open Tickets".to_string()),
            &QueryOptions::default(),
        );
        assert!(xml.contains("<qname>Open Tickets</qname>"), "{xml}");
        assert!(!xml.contains("<query>"), "query must be absent: {xml}");
        assert!(!xml.contains("<qid>"), "qid must be absent: {xml}");
    }

    #[test]
    fn id_selector_puts_only_qid_on_the_wire() {
        let xml = request_for(&QuerySelector::Id(6), &QueryOptions::default());
        assert!(xml.contains("<qid>6</qid>"), "{xml}");
        assert!(!xml.contains("<query>"), "query must be absent: {xml}");
        assert!(!xml.contains("<qname>"), "qname must be absent: {xml}");
    }

    #[test]
    fn wire_defaults_are_always_applied() {
        let xml = request_for(&QuerySelector::Id(1), &QueryOptions::default());
        assert!(xml.contains("<fmt>structured</fmt>"), "{xml}");
        assert!(xml.contains("<includeRids>1</includeRids>"), "{xml}");
    }

    #[test]
    fn caller_supplied_options_are_transmitted_unchanged() {
        let options = QueryOptions {
            column_list: Some("3.6.7".to_string()),
            sort_list: Some("7".to_string()),
            options: Some("num-10.sortorder-D".to_string()),
            return_percentage: true,
            udata: Some("trace-42".to_string()),
        };
        let xml = request_for(&QuerySelector::Id(1), &options);
        assert!(xml.contains("<clist>3.6.7</clist>"));
        assert!(xml.contains("<slist>7</slist>"));
        assert!(xml.contains("<options>num-10.sortorder-D</options>"));
        assert!(xml.contains("<returnpercentage>1</returnpercentage>"));
        assert!(xml.contains("<udata>trace-42</udata>"));
    }

    #[test]
    fn unset_options_stay_off_the_wire() {
        let xml = request_for(&QuerySelector::Id(1), &QueryOptions::default());
        assert!(!xml.contains("<clist>"));
        assert!(!xml.contains("<slist>"));
        assert!(!xml.contains("<options>"));
        assert!(!xml.contains("<returnpercentage>"));
        assert!(!xml.contains("<udata>"));
    }

    const STRUCTURED_RESPONSE: &str = r#"<?xml version="1.0" ?>
<qdbapi>
    <action>API_DoQuery</action>
    <errcode>0</errcode>
    <errtext>No error</errtext>
    <table>
        <fields>
            <field id="1" field_type="text"><label>Name</label></field>
            <field id="2" field_type="text"><label>Status</label></field>
        </fields>
        <records>
            <record rid="3">
                <f id="1">A</f>
                <f id="2">B</f>
                <update_id>1205700075470</update_id>
            </record>
            <record rid="4">
                <f id="1">C</f>
                <f id="2">D</f>
                <update_id>1205700075471</update_id>
            </record>
        </records>
    </table>
</qdbapi>"#;

    #[test]
    fn structured_response_builds_label_dictionary() {
        let response: DoQueryResponse = from_response_xml(STRUCTURED_RESPONSE).unwrap();
        assert!(check(&response).is_ok());
        let result = response.into_result();
        assert_eq!(result.labels.get(&1).map(String::as_str), Some("Name"));
        assert_eq!(result.labels.get(&2).map(String::as_str), Some("Status"));
    }

    #[test]
    fn structured_response_annotates_records_with_labels() {
        let response: DoQueryResponse = from_response_xml(STRUCTURED_RESPONSE).unwrap();
        let result = response.into_result();
        assert_eq!(result.records.len(), 2);

        let first = &result.records[0];
        assert_eq!(first.record_id(), Some(3));
        assert_eq!(first.update_id(), Some(1205700075470));
        let view = first.labeled();
        assert_eq!(view.get("Name"), Some(&"A"));
        assert_eq!(view.get("Status"), Some(&"B"));

        assert_eq!(result.records[1].get_by_label("Name"), Some("C"));
    }

    #[test]
    fn empty_result_decodes_to_no_records() {
        let xml = r#"<qdbapi>
    <action>API_DoQuery</action>
    <errcode>0</errcode>
    <errtext>No error</errtext>
    <table>
        <fields>
            <field id="1"><label>Name</label></field>
        </fields>
        <records></records>
    </table>
</qdbapi>"#;
        let response: DoQueryResponse = from_response_xml(xml).unwrap();
        let result = response.into_result();
        assert_eq!(result.labels.len(), 1);
        assert!(result.records.is_empty());
    }

    #[test]
    fn error_response_without_table_maps_to_vendor() {
        let xml = r#"<qdbapi>
    <action>API_DoQuery</action>
    <errcode>83</errcode>
    <errtext>No access</errtext>
</qdbapi>"#;
        let response: DoQueryResponse = from_response_xml(xml).unwrap();
        assert!(response.table.is_none());
        let err = check(&response).unwrap_err();
        assert!(matches!(err, Error::Vendor { code: 83, .. }));
    }
}
