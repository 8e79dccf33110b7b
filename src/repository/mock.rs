//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::record::{NewRecord, StoredRecord};
use crate::domain::types::{EntityKind, RecordId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{RecordListQuery, RecordReader, RecordWriter};

mock! {
    pub Repository {}

    impl RecordReader for Repository {
        fn get_record_by_id(
            &self,
            kind: EntityKind,
            id: RecordId,
        ) -> RepositoryResult<Option<StoredRecord>>;
        fn list_records(
            &self,
            query: RecordListQuery,
        ) -> RepositoryResult<(usize, Vec<StoredRecord>)>;
        fn list_record_names(&self, kind: EntityKind) -> RepositoryResult<Vec<(RecordId, String)>>;
        fn count_records(&self, kind: EntityKind) -> RepositoryResult<usize>;
    }

    impl RecordWriter for Repository {
        fn create_record(&self, record: &NewRecord) -> RepositoryResult<StoredRecord>;
        fn update_record(&self, id: RecordId, record: &NewRecord) -> RepositoryResult<StoredRecord>;
        fn delete_record(&self, kind: EntityKind, id: RecordId) -> RepositoryResult<()>;
    }
}
