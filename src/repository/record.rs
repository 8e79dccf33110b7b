use chrono::Utc;
use diesel::prelude::*;

use crate::domain::record::{NewRecord, StoredRecord};
use crate::domain::types::{EntityKind, RecordId};
use crate::models::record::{
    NewRecord as DbNewRecord, Record as DbRecord, UpdateRecord as DbUpdateRecord, encode_values,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, RecordListQuery, RecordReader, RecordWriter};
use crate::schema::records;

/// `LIKE` pattern matching `search` literally anywhere in the name.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn into_domain(records: Vec<DbRecord>) -> RepositoryResult<Vec<StoredRecord>> {
    records
        .into_iter()
        .map(|record| StoredRecord::try_from(record).map_err(RepositoryError::from))
        .collect()
}

impl RecordReader for DieselRepository {
    fn get_record_by_id(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> RepositoryResult<Option<StoredRecord>> {
        let mut conn = self.conn()?;
        let record = records::table
            .filter(records::id.eq(id.get()))
            .filter(records::kind.eq(kind.slug()))
            .select(DbRecord::as_select())
            .first::<DbRecord>(&mut conn)
            .optional()?;

        record
            .map(StoredRecord::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_records(&self, query: RecordListQuery) -> RepositoryResult<(usize, Vec<StoredRecord>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = records::table
                .filter(records::kind.eq(query.kind.slug()))
                .into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(search) = &query.search {
                items = items.filter(
                    records::name
                        .like(contains_pattern(search))
                        .escape('\\'),
                );
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((records::name.asc(), records::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items
                .limit(pagination.per_page as i64)
                .offset(pagination.offset() as i64);
        }
        let items = items
            .select(DbRecord::as_select())
            .load::<DbRecord>(&mut conn)?;

        Ok((total, into_domain(items)?))
    }

    fn list_record_names(&self, kind: EntityKind) -> RepositoryResult<Vec<(RecordId, String)>> {
        let mut conn = self.conn()?;
        let rows = records::table
            .filter(records::kind.eq(kind.slug()))
            .order(records::name.asc())
            .select((records::id, records::name))
            .load::<(i32, String)>(&mut conn)?;

        rows.into_iter()
            .map(|(id, name)| -> RepositoryResult<(RecordId, String)> {
                Ok((RecordId::new(id)?, name))
            })
            .collect()
    }

    fn count_records(&self, kind: EntityKind) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let total = records::table
            .filter(records::kind.eq(kind.slug()))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl RecordWriter for DieselRepository {
    fn create_record(&self, record: &NewRecord) -> RepositoryResult<StoredRecord> {
        let mut conn = self.conn()?;
        let insertable = DbNewRecord::try_from(record)?;

        let created = diesel::insert_into(records::table)
            .values(&insertable)
            .returning(DbRecord::as_returning())
            .get_result::<DbRecord>(&mut conn)?;

        Ok(StoredRecord::try_from(created)?)
    }

    fn update_record(&self, id: RecordId, record: &NewRecord) -> RepositoryResult<StoredRecord> {
        let mut conn = self.conn()?;
        let changes = DbUpdateRecord {
            name: record.name(),
            data: encode_values(&record.values)?,
            updated_at: Utc::now().naive_utc(),
        };

        let updated = diesel::update(
            records::table
                .filter(records::id.eq(id.get()))
                .filter(records::kind.eq(record.kind.slug())),
        )
        .set(&changes)
        .returning(DbRecord::as_returning())
        .get_result::<DbRecord>(&mut conn)?;

        Ok(StoredRecord::try_from(updated)?)
    }

    fn delete_record(&self, kind: EntityKind, id: RecordId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            records::table
                .filter(records::id.eq(id.get()))
                .filter(records::kind.eq(kind.slug())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
