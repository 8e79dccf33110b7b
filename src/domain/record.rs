//! Entity records exchanged between the API layer and the rendering contract.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{EntityKind, RecordId};

/// Default `strftime` pattern used when a date is shown in read views.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Single value stored under a record key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Empty means "nothing entered": null or whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Raw form suitable for an HTML input `value` attribute.
    pub fn to_input_value(&self) -> String {
        match self {
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            other => other.to_string(),
        }
    }

    /// Human readable form, dates follow the given locale pattern.
    pub fn display_with(&self, date_format: &str) -> String {
        match self {
            FieldValue::Date(date) => date.format(date_format).to_string(),
            FieldValue::Bool(true) => "Có".to_string(),
            FieldValue::Bool(false) => "Không".to_string(),
            other => other.to_string(),
        }
    }

    /// Plain JSON representation used when handing records to typed validators.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Text(text) => serde_json::Value::String(text.clone()),
            FieldValue::Number(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(flag) => serde_json::Value::Bool(*flag),
            FieldValue::Date(date) => {
                serde_json::Value::String(date.format("%Y-%m-%d").to_string())
            }
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Bool(flag) => write!(f, "{flag}"),
            FieldValue::Date(date) => write!(f, "{date}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// One business object as a key/value mapping, owned by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(BTreeMap<String, FieldValue>);

impl EntityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used by fixtures and descriptor-driven payloads.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Value under `key`, or `Null` when the key is absent.
    pub fn value(&self, key: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.0.get(key).unwrap_or(&NULL)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Overwrites the keys present in `other`, keeping everything else.
    pub fn merge(&mut self, other: &EntityRecord) {
        for (key, value) in other.iter() {
            self.0.insert(key.to_string(), value.clone());
        }
    }

    /// Record id stored under the synthetic `id` key, if any.
    pub fn record_id(&self) -> Option<RecordId> {
        self.value("id")
            .as_number()
            .and_then(|id| RecordId::new(id as i32).ok())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FieldValue)> for EntityRecord {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A record as persisted by the record store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub kind: EntityKind,
    pub values: EntityRecord,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StoredRecord {
    /// Flattens the stored record into the mapping consumed by tables and dialogs.
    pub fn to_entity_record(&self) -> EntityRecord {
        let mut record = self.values.clone();
        record.insert("id", self.id.get());
        record
    }

    /// Display name of the record, used for option lists and the unique key.
    pub fn name(&self) -> String {
        self.values.value(self.kind.name_field()).to_string()
    }
}

/// Payload for creating or replacing a record.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord {
    pub kind: EntityKind,
    pub values: EntityRecord,
}

impl NewRecord {
    #[must_use]
    pub fn new(kind: EntityKind, mut values: EntityRecord) -> Self {
        values.remove("id");
        Self { kind, values }
    }

    pub fn name(&self) -> String {
        self.values.value(self.kind.name_field()).to_string().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(FieldValue::Number(10.0).to_string(), "10");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn dates_use_locale_in_read_views_and_iso_in_inputs() {
        let date = NaiveDate::from_ymd_opt(2015, 3, 9).unwrap();
        let value = FieldValue::Date(date);
        assert_eq!(value.display_with(DEFAULT_DATE_FORMAT), "09/03/2015");
        assert_eq!(value.to_input_value(), "2015-03-09");
    }

    #[test]
    fn new_record_drops_synthetic_id() {
        let values = EntityRecord::new().with("id", 4).with("name", " Phòng A1 ");
        let new = NewRecord::new(EntityKind::Room, values);
        assert!(!new.values.contains_key("id"));
        assert_eq!(new.name(), "Phòng A1");
    }

    #[test]
    fn stored_record_exposes_id_field() {
        let stored = StoredRecord {
            id: RecordId::new(3).unwrap(),
            kind: EntityKind::Branch,
            values: EntityRecord::new().with("name", "Quận 1"),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        let record = stored.to_entity_record();
        assert_eq!(record.record_id(), Some(stored.id));
        assert_eq!(stored.name(), "Quận 1");
    }

    #[test]
    fn merge_overwrites_only_given_keys() {
        let mut record = EntityRecord::new().with("name", "An").with("branch_id", 1);
        record.merge(&EntityRecord::new().with("branch_id", 2));
        assert_eq!(record.value("name"), &FieldValue::from("An"));
        assert_eq!(record.value("branch_id"), &FieldValue::Number(2.0));
    }
}
