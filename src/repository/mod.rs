//! Record store traits and their Diesel implementation.

use crate::db::{DbConnection, DbPool};
use crate::domain::record::{NewRecord, StoredRecord};
use crate::domain::types::{EntityKind, RecordId};
use crate::repository::errors::RepositoryResult;

pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod persistence;
pub mod record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows to skip; page numbers start at 1 and 0 is read as 1.
    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1) * self.per_page
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListQuery {
    pub kind: EntityKind,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl RecordListQuery {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            search: None,
            pagination: None,
        }
    }

    /// Filters by name; blank input is ignored.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait RecordReader {
    fn get_record_by_id(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> RepositoryResult<Option<StoredRecord>>;

    /// Total matching rows and the requested page, ordered by name.
    fn list_records(&self, query: RecordListQuery) -> RepositoryResult<(usize, Vec<StoredRecord>)>;

    /// `(id, name)` of every record of `kind`, ordered by name.
    fn list_record_names(&self, kind: EntityKind) -> RepositoryResult<Vec<(RecordId, String)>>;

    fn count_records(&self, kind: EntityKind) -> RepositoryResult<usize>;
}

pub trait RecordWriter {
    fn create_record(&self, record: &NewRecord) -> RepositoryResult<StoredRecord>;

    /// Replaces the values of record `id`; its kind must match.
    fn update_record(&self, id: RecordId, record: &NewRecord) -> RepositoryResult<StoredRecord>;

    fn delete_record(&self, kind: EntityKind, id: RecordId) -> RepositoryResult<()>;
}

/// Diesel-backed record store.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
