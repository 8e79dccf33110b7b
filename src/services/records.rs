//! Management pages: tables, dialogs and deletion for every entity kind.

use crate::descriptors::SelectOption;
use crate::dialog::{DialogMode, DialogObserver, DialogOrchestrator, SubmitOutcome};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::record::EntityRecord;
use crate::domain::types::{EntityKind, RecordId, Role};
use crate::dto::records::{DialogPageData, ManageQuery, ManagementPageData, SubmitResult};
use crate::entities::{DescriptorContext, ReferenceOptions, assignment_form, definition, dialog_title};
use crate::forms::submission::{DialogSubmission, DialogTarget};
use crate::pagination::Pager;
use crate::repository::persistence::RecordPersistence;
use crate::repository::{RecordListQuery, RecordReader, RecordWriter};
use crate::services::{PageSettings, ServiceError, ServiceResult, ensure_role};
use crate::table::Table;

/// Roles allowed to manage records of `kind`.
pub fn management_roles(kind: EntityKind) -> &'static [Role] {
    match kind {
        EntityKind::Branch | EntityKind::Facility => &[Role::Admin],
        _ => &[Role::Admin, Role::Manager],
    }
}

/// Page listing the records of `kind`.
pub fn manage_url(kind: EntityKind) -> String {
    format!("/manage/{}", kind.slug())
}

/// Option lists for every kind referenced by `kind`'s descriptors.
pub fn load_reference_options<R>(repo: &R, kind: EntityKind) -> ServiceResult<ReferenceOptions>
where
    R: RecordReader + ?Sized,
{
    let mut options = ReferenceOptions::default();
    for reference in definition(kind).references() {
        let names = repo.list_record_names(*reference).map_err(|err| {
            log::error!("Failed to load {reference} options: {err}");
            err
        })?;
        options.set(
            *reference,
            names
                .into_iter()
                .map(|(id, name)| SelectOption::new(id.to_string(), name))
                .collect(),
        );
    }
    Ok(options)
}

fn descriptor_context<R>(
    repo: &R,
    kind: EntityKind,
    mode: DialogMode,
    settings: &PageSettings,
) -> ServiceResult<DescriptorContext>
where
    R: RecordReader + ?Sized,
{
    Ok(DescriptorContext::new(mode, settings.today)
        .with_options(load_reference_options(repo, kind)?)
        .with_date_format(settings.date_format.clone()))
}

/// Loads one page of records rendered through the kind's columns.
pub fn load_management_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    kind: EntityKind,
    query: ManageQuery,
    settings: &PageSettings,
) -> ServiceResult<ManagementPageData>
where
    R: RecordReader + ?Sized,
{
    ensure_role(user, management_roles(kind))?;

    let page = query.page.unwrap_or(1).max(1);
    let search_query = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let mut list_query = RecordListQuery::new(kind).paginate(page, settings.items_per_page);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let (total, stored) = repo.list_records(list_query).map_err(|err| {
        log::error!("Failed to list {kind}: {err}");
        err
    })?;

    let ctx = descriptor_context(repo, kind, DialogMode::Create, settings)?;
    let entity = definition(kind);
    let columns = entity.columns(&ctx);
    let actions = entity.row_actions();
    let records: Vec<EntityRecord> = stored.iter().map(|record| record.to_entity_record()).collect();
    let table = Table::new(&columns, &records).with_actions(&actions).render();

    Ok(ManagementPageData {
        slug: kind.slug(),
        title: kind.title(),
        table,
        pager: Pager::from_total(page, total, settings.items_per_page),
        total,
        search_query,
    })
}

/// Opens the dialog addressed by `target` with a fresh form.
fn prepare_dialog<R>(
    repo: &R,
    kind: EntityKind,
    target: DialogTarget,
    settings: &PageSettings,
) -> ServiceResult<DialogOrchestrator>
where
    R: RecordReader + ?Sized,
{
    let entity = definition(kind);
    let mut dialog = DialogOrchestrator::new();

    let load = |id: RecordId| -> ServiceResult<EntityRecord> {
        repo.get_record_by_id(kind, id)
            .map_err(|err| {
                log::error!("Failed to load {kind} #{id}: {err}");
                err
            })?
            .map(|record| record.to_entity_record())
            .ok_or(ServiceError::NotFound)
    };

    match target {
        DialogTarget::Create => {
            let ctx = descriptor_context(repo, kind, DialogMode::Create, settings)?;
            dialog.open_create(entity.fields(&ctx), entity.validator(&ctx))?;
        }
        DialogTarget::Edit(id) => {
            let record = load(id)?;
            let ctx = descriptor_context(repo, kind, DialogMode::Edit, settings)?;
            dialog.open_edit(record, entity.fields(&ctx), entity.validator(&ctx))?;
        }
        DialogTarget::Assign(id, action) => {
            let ctx = descriptor_context(repo, kind, DialogMode::Edit, settings)?;
            let (fields, validator) =
                assignment_form(kind, action, &ctx).ok_or(ServiceError::NotFound)?;
            let record = load(id)?;
            dialog.open_edit(record, fields, validator)?;
        }
    }

    Ok(dialog)
}

fn dialog_page(
    kind: EntityKind,
    target: DialogTarget,
    dialog: &DialogOrchestrator,
) -> ServiceResult<DialogPageData> {
    let view = dialog
        .view()
        .ok_or_else(|| ServiceError::Internal("dialog is not open".to_string()))?;
    let title = match target {
        DialogTarget::Assign(_, action) => action.label().to_string(),
        _ => dialog_title(kind, view.mode),
    };

    Ok(DialogPageData {
        slug: kind.slug(),
        title,
        action_url: format!("{}/save", manage_url(kind)),
        cancel_url: manage_url(kind),
        hidden_fields: target.hidden_fields(),
        dialog: view,
    })
}

/// Loads the create, edit or assignment dialog of `kind`.
pub fn open_dialog<R>(
    repo: &R,
    user: &AuthenticatedUser,
    kind: EntityKind,
    target: DialogTarget,
    settings: &PageSettings,
) -> ServiceResult<DialogPageData>
where
    R: RecordReader + ?Sized,
{
    ensure_role(user, management_roles(kind))?;
    let dialog = prepare_dialog(repo, kind, target, settings)?;
    dialog_page(kind, target, &dialog)
}

/// Builds the confirmation message once a dialog has been saved.
struct SaveNotice {
    kind: EntityKind,
    message: Option<String>,
}

impl DialogObserver for SaveNotice {
    fn on_success(&mut self, submitted: &EntityRecord) {
        let name = submitted.value(self.kind.name_field()).to_string();
        self.message = Some(if name.trim().is_empty() {
            "Đã lưu thay đổi.".to_string()
        } else {
            format!("Đã lưu \"{}\".", name.trim())
        });
    }
}

/// Validates and saves a posted dialog.
///
/// Invalid or rejected submissions come back as a dialog page keeping the
/// entered values.
pub fn submit_dialog<R>(
    repo: &R,
    user: &AuthenticatedUser,
    kind: EntityKind,
    submission: DialogSubmission,
    settings: &PageSettings,
) -> ServiceResult<SubmitResult>
where
    R: RecordReader + RecordWriter + ?Sized,
{
    ensure_role(user, management_roles(kind))?;

    let mut dialog = prepare_dialog(repo, kind, submission.target, settings)?;
    dialog
        .form_mut()
        .ok_or_else(|| ServiceError::Internal("dialog is not open".to_string()))?
        .apply_form_data(&submission.pairs);

    let persistence = RecordPersistence::new(repo, kind);
    let mut notice = SaveNotice {
        kind,
        message: None,
    };

    match dialog.submit(&persistence, &mut notice) {
        SubmitOutcome::Saved(_) => Ok(SubmitResult::Saved(
            notice.message.unwrap_or_else(|| "Đã lưu thay đổi.".to_string()),
        )),
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => Ok(SubmitResult::Rejected(
            Box::new(dialog_page(kind, submission.target, &dialog)?),
        )),
        SubmitOutcome::Ignored => Err(ServiceError::Internal(
            "dialog submission was ignored".to_string(),
        )),
    }
}

/// Deletes record `id` of `kind`.
pub fn delete_record<R>(
    repo: &R,
    user: &AuthenticatedUser,
    kind: EntityKind,
    id: i32,
) -> ServiceResult<()>
where
    R: RecordWriter + ?Sized,
{
    ensure_role(user, management_roles(kind))?;
    let id = RecordId::new(id)?;

    repo.delete_record(kind, id).map_err(|err| {
        log::error!("Failed to delete {kind} #{id}: {err}");
        match err {
            crate::repository::errors::RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::record::{FieldValue, StoredRecord};
    use crate::forms::validation::ErrorKind;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::table::AssignKind;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            roles: roles.iter().map(|role| role.to_string()).collect(),
            exp: 0,
        }
    }

    fn settings() -> PageSettings {
        PageSettings {
            date_format: "%d/%m/%Y".to_string(),
            items_per_page: 20,
            today: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        }
    }

    fn stored(id: i32, kind: EntityKind, values: EntityRecord) -> StoredRecord {
        let now = Utc::now().naive_utc();
        StoredRecord {
            id: RecordId::new(id).unwrap(),
            kind,
            values,
            created_at: now,
            updated_at: now,
        }
    }

    fn facility_names(repo: &mut MockRepository) {
        repo.expect_list_record_names()
            .withf(|kind| *kind == EntityKind::Facility)
            .returning(|_| Ok(vec![(RecordId::new(1).unwrap(), "Cơ sở Lê Lợi".to_string())]));
    }

    #[test]
    fn parents_cannot_manage_records() {
        let mut repo = MockRepository::new();
        repo.expect_list_records().times(0);

        let result = load_management_page(
            &repo,
            &user(&["parent"]),
            EntityKind::Room,
            ManageQuery::default(),
            &settings(),
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn managers_cannot_manage_branches() {
        let repo = MockRepository::new();
        let result = open_dialog(
            &repo,
            &user(&["manager"]),
            EntityKind::Branch,
            DialogTarget::Create,
            &settings(),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn management_page_renders_reference_labels_and_actions() {
        let mut repo = MockRepository::new();
        facility_names(&mut repo);
        repo.expect_list_records()
            .withf(|query| query.kind == EntityKind::Room && query.search.as_deref() == Some("A"))
            .returning(|_| {
                Ok((
                    1,
                    vec![stored(
                        5,
                        EntityKind::Room,
                        EntityRecord::new()
                            .with("name", "Phòng A1")
                            .with("facility_id", "1")
                            .with("capacity", 10),
                    )],
                ))
            });

        let page = load_management_page(
            &repo,
            &user(&["manager"]),
            EntityKind::Room,
            ManageQuery {
                q: Some(" A ".to_string()),
                page: None,
            },
            &settings(),
        )
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.search_query.as_deref(), Some("A"));
        let row = &page.table.rows[0];
        assert_eq!(row.id, Some(5));
        assert_eq!(row.cells[1].text, "Cơ sở Lê Lợi");
        assert_eq!(row.actions.len(), 3);
    }

    #[test]
    fn create_submission_saves_and_reports_the_name() {
        let mut repo = MockRepository::new();
        facility_names(&mut repo);
        repo.expect_create_record()
            .withf(|record| {
                record.kind == EntityKind::Room
                    && record.values.value("capacity") == &FieldValue::Number(10.0)
            })
            .times(1)
            .returning(|record| Ok(stored(1, record.kind, record.values.clone())));

        let submission = DialogSubmission::parse(
            "_target=create&name=Ph%C3%B2ng+A1&facility_id=1&capacity=10",
        )
        .unwrap();
        let result =
            submit_dialog(&repo, &user(&["admin"]), EntityKind::Room, submission, &settings())
                .unwrap();

        assert_eq!(result, SubmitResult::Saved("Đã lưu \"Phòng A1\".".to_string()));
    }

    #[test]
    fn invalid_submission_renders_the_dialog_again() {
        let mut repo = MockRepository::new();
        facility_names(&mut repo);
        repo.expect_create_record().times(0);

        let submission = DialogSubmission::parse("_target=create&name=&capacity=5").unwrap();
        let result =
            submit_dialog(&repo, &user(&["admin"]), EntityKind::Room, submission, &settings())
                .unwrap();

        let SubmitResult::Rejected(page) = result else {
            panic!("expected the dialog to stay open");
        };
        let name = page.dialog.form.field("name").unwrap();
        assert_eq!(name.error.as_ref().unwrap().kind, ErrorKind::Required);
        assert_eq!(page.hidden_fields[0].value, "create");
    }

    #[test]
    fn repository_rejection_keeps_entered_values() {
        let mut repo = MockRepository::new();
        facility_names(&mut repo);
        repo.expect_create_record()
            .returning(|_| Err(RepositoryError::DatabaseError("disk full".to_string())));

        let submission =
            DialogSubmission::parse("_target=create&name=Ph%C3%B2ng+B&facility_id=1&capacity=8")
                .unwrap();
        let result =
            submit_dialog(&repo, &user(&["admin"]), EntityKind::Room, submission, &settings())
                .unwrap();

        let SubmitResult::Rejected(page) = result else {
            panic!("expected the dialog to stay open");
        };
        let error = page.dialog.submit_error.as_ref().unwrap();
        assert_eq!(error.kind, ErrorKind::SubmitFailed);
        assert!(error.message.contains("disk full"));
        assert_eq!(
            page.dialog.form.field("name").unwrap().input,
            crate::forms::renderer::RenderedInput::Line {
                input_type: "text",
                value: "Phòng B".to_string()
            }
        );
    }

    #[test]
    fn assignment_merges_onto_the_stored_record() {
        let mut repo = MockRepository::new();
        repo.expect_list_record_names()
            .withf(|kind| *kind == EntityKind::Branch)
            .returning(|_| Ok(vec![(RecordId::new(2).unwrap(), "Quận 3".to_string())]));
        repo.expect_get_record_by_id().returning(|kind, id| {
            Ok(Some(stored(
                id.get(),
                kind,
                EntityRecord::new()
                    .with("full_name", "Võ Lan")
                    .with("email", "lan@example.com")
                    .with("position", "teacher"),
            )))
        });
        repo.expect_update_record()
            .withf(|id, record| {
                id.get() == 7
                    && record.values.value("branch_id") == &FieldValue::from("2")
                    && record.values.value("email") == &FieldValue::from("lan@example.com")
            })
            .times(1)
            .returning(|id, record| Ok(stored(id.get(), record.kind, record.values.clone())));

        let submission =
            DialogSubmission::parse("_target=assign&_id=7&_action=branch&branch_id=2").unwrap();
        let result =
            submit_dialog(&repo, &user(&["manager"]), EntityKind::Staff, submission, &settings())
                .unwrap();

        assert!(matches!(result, SubmitResult::Saved(_)));
    }

    #[test]
    fn unsupported_assignment_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_list_record_names().returning(|_| Ok(Vec::new()));
        let result = open_dialog(
            &repo,
            &user(&["admin"]),
            EntityKind::Schedule,
            DialogTarget::Assign(RecordId::new(1).unwrap(), AssignKind::Benefit),
            &settings(),
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn delete_maps_missing_rows_to_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_record()
            .returning(|_, _| Err(RepositoryError::NotFound));
        let result = delete_record(&repo, &user(&["admin"]), EntityKind::Room, 3);
        assert!(matches!(result, Err(ServiceError::NotFound)));

        let result = delete_record(&repo, &user(&["admin"]), EntityKind::Room, 0);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }
}
