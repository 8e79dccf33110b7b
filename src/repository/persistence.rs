//! Record store adapter for the dialog orchestrator.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};

use crate::dialog::{Persistence, SubmitError};
use crate::domain::record::{EntityRecord, NewRecord};
use crate::domain::types::EntityKind;
use crate::forms::validation::{FieldError, ValidationErrors};
use crate::repository::errors::RepositoryError;
use crate::repository::{RecordReader, RecordWriter};

pub const MSG_DUPLICATE_NAME: &str = "Tên này đã được sử dụng";
pub const MSG_RECORD_MISSING: &str = "Bản ghi không tồn tại hoặc đã bị xóa";
pub const MSG_SAVE_FAILED: &str = "Không thể lưu dữ liệu, vui lòng thử lại sau";

pub const PASSWORD_FIELD: &str = "password";
pub const PASSWORD_HASH_FIELD: &str = "password_hash";

/// Replaces a plaintext password with its argon2 PHC string.
fn protect_password(values: &mut EntityRecord) -> Result<(), SubmitError> {
    let Some(password) = values.remove(PASSWORD_FIELD) else {
        return Ok(());
    };
    if password.is_empty() {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.to_input_value().as_bytes(), &salt)
        .map_err(|err| {
            log::error!("Failed to hash password: {err}");
            SubmitError::Rejected(MSG_SAVE_FAILED.to_string())
        })?
        .to_string();
    values.insert(PASSWORD_HASH_FIELD, hash);
    Ok(())
}

/// Writes dialog payloads of one entity kind to a record store.
///
/// Updates merge the payload onto the stored values, so reduced forms
/// such as assignments only touch their own fields.
pub struct RecordPersistence<'a, R: ?Sized> {
    repo: &'a R,
    kind: EntityKind,
}

impl<'a, R> RecordPersistence<'a, R>
where
    R: RecordReader + RecordWriter + ?Sized,
{
    pub fn new(repo: &'a R, kind: EntityKind) -> Self {
        Self { repo, kind }
    }

    fn submit_error(&self, err: RepositoryError) -> SubmitError {
        log::error!("Failed to save {} record: {err}", self.kind);
        if err.is_unique_violation() {
            return SubmitError::Invalid(ValidationErrors::single(
                self.kind.name_field(),
                FieldError::invalid(MSG_DUPLICATE_NAME),
            ));
        }
        match err {
            RepositoryError::NotFound => SubmitError::Rejected(MSG_RECORD_MISSING.to_string()),
            _ => SubmitError::Rejected(MSG_SAVE_FAILED.to_string()),
        }
    }
}

impl<R> Persistence for RecordPersistence<'_, R>
where
    R: RecordReader + RecordWriter + ?Sized,
{
    fn create(&self, payload: &EntityRecord) -> Result<EntityRecord, SubmitError> {
        let mut values = payload.clone();
        protect_password(&mut values)?;
        let record = NewRecord::new(self.kind, values);
        self.repo
            .create_record(&record)
            .map(|stored| stored.to_entity_record())
            .map_err(|err| self.submit_error(err))
    }

    fn update(
        &self,
        current: &EntityRecord,
        payload: &EntityRecord,
    ) -> Result<EntityRecord, SubmitError> {
        let id = current
            .record_id()
            .ok_or_else(|| SubmitError::Rejected(MSG_RECORD_MISSING.to_string()))?;
        let stored = self
            .repo
            .get_record_by_id(self.kind, id)
            .map_err(|err| self.submit_error(err))?
            .ok_or_else(|| SubmitError::Rejected(MSG_RECORD_MISSING.to_string()))?;

        let mut values = stored.values;
        values.merge(payload);
        protect_password(&mut values)?;

        self.repo
            .update_record(id, &NewRecord::new(self.kind, values))
            .map(|stored| stored.to_entity_record())
            .map_err(|err| self.submit_error(err))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;

    use super::*;
    use crate::domain::record::{FieldValue, StoredRecord};
    use crate::domain::types::RecordId;
    use crate::repository::RecordListQuery;
    use crate::repository::errors::RepositoryResult;

    #[derive(Default)]
    struct MemoryRepo {
        rows: RefCell<Vec<StoredRecord>>,
    }

    impl RecordReader for MemoryRepo {
        fn get_record_by_id(
            &self,
            kind: EntityKind,
            id: RecordId,
        ) -> RepositoryResult<Option<StoredRecord>> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .find(|row| row.kind == kind && row.id == id)
                .cloned())
        }

        fn list_records(
            &self,
            _query: RecordListQuery,
        ) -> RepositoryResult<(usize, Vec<StoredRecord>)> {
            let rows = self.rows.borrow().clone();
            Ok((rows.len(), rows))
        }

        fn list_record_names(
            &self,
            _kind: EntityKind,
        ) -> RepositoryResult<Vec<(RecordId, String)>> {
            Ok(Vec::new())
        }

        fn count_records(&self, _kind: EntityKind) -> RepositoryResult<usize> {
            Ok(self.rows.borrow().len())
        }
    }

    impl RecordWriter for MemoryRepo {
        fn create_record(&self, record: &NewRecord) -> RepositoryResult<StoredRecord> {
            let mut rows = self.rows.borrow_mut();
            if record.kind.has_unique_name()
                && rows
                    .iter()
                    .any(|row| row.kind == record.kind && row.name() == record.name())
            {
                return Err(RepositoryError::ConstraintViolation(
                    "Unique constraint violation: records.kind, records.name".to_string(),
                ));
            }
            let now = Utc::now().naive_utc();
            let stored = StoredRecord {
                id: RecordId::new(rows.len() as i32 + 1)?,
                kind: record.kind,
                values: record.values.clone(),
                created_at: now,
                updated_at: now,
            };
            rows.push(stored.clone());
            Ok(stored)
        }

        fn update_record(
            &self,
            id: RecordId,
            record: &NewRecord,
        ) -> RepositoryResult<StoredRecord> {
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .iter_mut()
                .find(|row| row.id == id && row.kind == record.kind)
                .ok_or(RepositoryError::NotFound)?;
            row.values = record.values.clone();
            Ok(row.clone())
        }

        fn delete_record(&self, _kind: EntityKind, _id: RecordId) -> RepositoryResult<()> {
            Ok(())
        }
    }

    #[test]
    fn create_returns_the_record_with_its_id() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Room);

        let saved = persistence
            .create(&EntityRecord::new().with("name", "Phòng A1").with("capacity", 10))
            .unwrap();

        assert_eq!(saved.record_id().map(RecordId::get), Some(1));
        assert_eq!(saved.value("capacity"), &FieldValue::Number(10.0));
    }

    #[test]
    fn duplicate_names_become_a_field_error() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Branch);
        let payload = EntityRecord::new().with("name", "Quận 1");
        persistence.create(&payload).unwrap();

        let err = persistence.create(&payload).unwrap_err();

        assert_eq!(
            err,
            SubmitError::Invalid(ValidationErrors::single(
                "name",
                FieldError::invalid(MSG_DUPLICATE_NAME)
            ))
        );
    }

    #[test]
    fn people_may_share_a_name() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Student);

        persistence
            .create(&EntityRecord::new().with("full_name", "Nguyễn Văn An"))
            .unwrap();
        persistence
            .create(&EntityRecord::new().with("full_name", "Nguyễn Văn An"))
            .unwrap();

        assert_eq!(repo.rows.borrow().len(), 2);
    }

    #[test]
    fn passwords_are_stored_as_argon2_hashes() {
        use argon2::PasswordVerifier;
        use argon2::password_hash::PasswordHash;

        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Staff);

        let saved = persistence
            .create(
                &EntityRecord::new()
                    .with("full_name", "Phạm Minh")
                    .with(PASSWORD_FIELD, "SuperSecret123"),
            )
            .unwrap();

        let stored = repo.rows.borrow()[0].values.clone();
        assert!(!stored.contains_key(PASSWORD_FIELD));
        assert!(!saved.contains_key(PASSWORD_FIELD));
        let hash = stored.value(PASSWORD_HASH_FIELD).to_input_value();
        assert!(!hash.contains("SuperSecret123"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"SuperSecret123", &parsed)
                .is_ok()
        );
    }

    #[test]
    fn storage_errors_are_not_shown_verbatim() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Room);

        let err = persistence
            .submit_error(RepositoryError::DatabaseError("disk I/O error".to_string()));

        assert_eq!(err, SubmitError::Rejected(MSG_SAVE_FAILED.to_string()));
    }

    #[test]
    fn update_merges_onto_stored_values() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Staff);
        let created = persistence
            .create(
                &EntityRecord::new()
                    .with("full_name", "Phạm Minh")
                    .with("email", "minh@example.com"),
            )
            .unwrap();

        let updated = persistence
            .update(&created, &EntityRecord::new().with("branch_id", "2"))
            .unwrap();

        assert_eq!(updated.value("email"), &FieldValue::from("minh@example.com"));
        assert_eq!(updated.value("branch_id"), &FieldValue::from("2"));
    }

    #[test]
    fn update_without_a_stored_row_is_rejected() {
        let repo = MemoryRepo::default();
        let persistence = RecordPersistence::new(&repo, EntityKind::Room);
        let err = persistence
            .update(&EntityRecord::new().with("id", 9), &EntityRecord::new())
            .unwrap_err();
        assert_eq!(err, SubmitError::Rejected(MSG_RECORD_MISSING.to_string()));
    }
}
