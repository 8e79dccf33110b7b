use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::record::{EntityRecord, NewRecord as DomainNewRecord, StoredRecord};
use crate::domain::types::{EntityKind, RecordId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::records)]
/// Diesel model for [`StoredRecord`].
pub struct Record {
    pub id: i32,
    pub kind: String,
    pub name: String,
    pub data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::records)]
/// Insertable form of [`Record`].
pub struct NewRecord<'a> {
    pub kind: &'a str,
    pub name: String,
    pub data: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::records)]
/// Data used when replacing the values of a [`Record`].
pub struct UpdateRecord {
    pub name: String,
    pub data: String,
    pub updated_at: NaiveDateTime,
}

/// Serialises record values into the `data` column.
pub fn encode_values(values: &EntityRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(values)
}

impl TryFrom<Record> for StoredRecord {
    type Error = TypeConstraintError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let values: EntityRecord = serde_json::from_str(&record.data)
            .map_err(|err| TypeConstraintError::InvalidValue(format!("record data: {err}")))?;
        Ok(Self {
            id: RecordId::new(record.id)?,
            kind: record.kind.parse::<EntityKind>()?,
            values,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewRecord> for NewRecord<'a> {
    type Error = serde_json::Error;

    fn try_from(record: &'a DomainNewRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: record.kind.slug(),
            name: record.name(),
            data: encode_values(&record.values)?,
        })
    }
}
