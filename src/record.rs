//! In-memory record model and the wire field-list normalization.
//!
//! QuickBase is inconsistent about how a record's fields travel on the
//! wire: requests send `<field fid="N">value</field>`, query responses
//! return `<f id="N">value</f>`. Both shapes are confined to this module —
//! operations only ever see [`Record`], a field-id-keyed map whose values
//! are plain strings (QuickBase's wire format is untyped text).
//!
//! Field ids are stable, server-assigned, and unique per database schema;
//! labels may be renamed at any time and are carried only as annotation
//! metadata resolved from a query's field-definition block. Labels must
//! never be used as the identity key for a field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single field's label annotation and string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Human-readable label, known only after a query resolved the
    /// field-definition block. `None` for records built locally.
    pub label: Option<String>,
    /// The field's value in QuickBase's untyped text form.
    pub value: String,
}

/// A QuickBase record: server-assigned identity plus a field-id-keyed map.
///
/// For a record built locally (to add or edit), only `fields` is populated.
/// Records decoded from a query also carry `record_id` and `update_id`, the
/// server's optimistic-concurrency token that changes on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    record_id: Option<u32>,
    update_id: Option<u64>,
    fields: BTreeMap<u32, Field>,
}

impl Record {
    /// Creates an empty record with no fields and no server identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value by its field id, replacing any previous value.
    pub fn set(&mut self, field_id: u32, value: impl Into<String>) {
        self.fields.insert(
            field_id,
            Field {
                label: None,
                value: value.into(),
            },
        );
    }

    /// Returns a field's value by its field id.
    pub fn get(&self, field_id: u32) -> Option<&str> {
        self.fields.get(&field_id).map(|f| f.value.as_str())
    }

    /// Returns a field's value by its label.
    ///
    /// Labels are only available on records decoded from a query; records
    /// built locally always return `None` here. If two fields somehow share
    /// a label, the one with the lowest field id wins.
    pub fn get_by_label(&self, label: &str) -> Option<&str> {
        self.fields
            .values()
            .find(|f| f.label.as_deref() == Some(label))
            .map(|f| f.value.as_str())
    }

    /// The server-assigned record id, if this record came from the server.
    pub fn record_id(&self) -> Option<u32> {
        self.record_id
    }

    /// The optimistic-concurrency token, if this record came from the
    /// server. Changes on every edit.
    pub fn update_id(&self) -> Option<u64> {
        self.update_id
    }

    /// Number of fields held by this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in ascending field-id order.
    pub fn fields(&self) -> impl Iterator<Item = (u32, &Field)> {
        self.fields.iter().map(|(id, f)| (*id, f))
    }

    /// The label-keyed view of this record: `label → value` for every field
    /// whose label is known. Unlabeled fields are omitted.
    pub fn labeled(&self) -> BTreeMap<&str, &str> {
        self.fields
            .values()
            .filter_map(|f| Some((f.label.as_deref()?, f.value.as_str())))
            .collect()
    }

    /// Converts the field map to the request wire shape, in field-id order.
    pub(crate) fn wire_fields(&self) -> Vec<WireField> {
        self.fields
            .iter()
            .map(|(id, f)| WireField {
                fid: *id,
                value: f.value.clone(),
            })
            .collect()
    }

    /// Rebuilds a record from a query response row, annotating each field
    /// with its label from the field-definition dictionary.
    pub(crate) fn from_wire(
        record_id: Option<u32>,
        update_id: Option<u64>,
        fields: Vec<ReadField>,
        labels: &BTreeMap<u32, String>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .map(|f| {
                (
                    f.id,
                    Field {
                        label: labels.get(&f.id).cloned(),
                        value: f.value,
                    },
                )
            })
            .collect();
        Record {
            record_id,
            update_id,
            fields,
        }
    }
}

/// Identifies the record targeted by an edit.
///
/// QuickBase accepts either the server-assigned record id or a value of the
/// table's designated key field, but never both. Encoding the choice as an
/// enum resolves the conflict before serialization instead of leaving two
/// optional fields to fight over precedence on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Target by the server-assigned record id (`<rid>`).
    Rid(u32),
    /// Target by a value of the table's key field (`<key>`).
    Key(String),
}

/// Request wire shape: `<field fid="N">value</field>`.
#[derive(Debug, Serialize)]
pub(crate) struct WireField {
    #[serde(rename = "@fid")]
    pub(crate) fid: u32,
    #[serde(rename = "$text")]
    pub(crate) value: String,
}

/// Response wire shape: `<f id="N">value</f>`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReadField {
    #[serde(rename = "@id")]
    pub(crate) id: u32,
    #[serde(rename = "$text", default)]
    pub(crate) value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_by_field_id() {
        let mut record = Record::new();
        record.set(6, "widget");
        record.set(7, "blue");
        assert_eq!(record.get(6), Some("widget"));
        assert_eq!(record.get(7), Some("blue"));
        assert_eq!(record.get(8), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut record = Record::new();
        record.set(6, "first");
        record.set(6, "second");
        assert_eq!(record.get(6), Some("second"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn wire_fields_are_ordered_by_field_id() {
        let mut record = Record::new();
        record.set(9, "c");
        record.set(6, "a");
        record.set(7, "b");
        let wire = record.wire_fields();
        let ids: Vec<u32> = wire.iter().map(|f| f.fid).collect();
        assert_eq!(ids, vec![6, 7, 9]);
    }

    #[test]
    fn from_wire_annotates_labels_from_dictionary() {
        let mut labels = BTreeMap::new();
        labels.insert(1, "Name".to_string());
        labels.insert(2, "Status".to_string());

        let record = Record::from_wire(
            Some(42),
            Some(1205700075470_u64),
            vec![
                ReadField {
                    id: 1,
                    value: "A".to_string(),
                },
                ReadField {
                    id: 2,
                    value: "B".to_string(),
                },
            ],
            &labels,
        );

        assert_eq!(record.record_id(), Some(42));
        assert_eq!(record.update_id(), Some(1205700075470));
        assert_eq!(record.get_by_label("Name"), Some("A"));
        assert_eq!(record.get_by_label("Status"), Some("B"));

        let view = record.labeled();
        assert_eq!(view.get("Name"), Some(&"A"));
        assert_eq!(view.get("Status"), Some(&"B"));
    }

    #[test]
    fn from_wire_leaves_unknown_field_ids_unlabeled() {
        let labels = BTreeMap::from([(1, "Name".to_string())]);
        let record = Record::from_wire(
            None,
            None,
            vec![
                ReadField {
                    id: 1,
                    value: "A".to_string(),
                },
                ReadField {
                    id: 99,
                    value: "orphan".to_string(),
                },
            ],
            &labels,
        );
        // Field 99 is still reachable by id, just absent from the
        // label-keyed view.
        assert_eq!(record.get(99), Some("orphan"));
        assert_eq!(record.labeled().len(), 1);
    }

    #[test]
    fn local_record_has_no_labels() {
        let mut record = Record::new();
        record.set(6, "widget");
        assert_eq!(record.get_by_label("Name"), None);
        assert!(record.labeled().is_empty());
        assert_eq!(record.record_id(), None);
        assert_eq!(record.update_id(), None);
    }
}
