use crate::dialog::DialogMode;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::record::EntityRecord;
use crate::domain::types::{EntityKind, Role};
use crate::dto::dashboard::{DashboardCard, DashboardPageData};
use crate::entities::{DescriptorContext, definition};
use crate::repository::{RecordListQuery, RecordReader};
use crate::services::records::{load_reference_options, management_roles, manage_url};
use crate::services::{PageSettings, ServiceError, ServiceResult};
use crate::table::Table;

/// Loads the dashboard of the user's primary role.
///
/// Admins and managers get one card per kind they may manage, parents get
/// the class timetable.
pub fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    settings: &PageSettings,
) -> ServiceResult<DashboardPageData>
where
    R: RecordReader + ?Sized,
{
    let role = user.primary_role().ok_or(ServiceError::Unauthorized)?;

    match role {
        Role::Admin | Role::Manager => {
            let mut cards = Vec::new();
            for kind in EntityKind::ALL {
                if !management_roles(kind).contains(&role) {
                    continue;
                }
                let count = repo.count_records(kind).map_err(|err| {
                    log::error!("Failed to count {kind}: {err}");
                    err
                })?;
                cards.push(DashboardCard {
                    slug: kind.slug(),
                    title: kind.title(),
                    count,
                    url: manage_url(kind),
                });
            }
            Ok(DashboardPageData {
                role,
                cards,
                timetable: None,
            })
        }
        Role::Parent => {
            let kind = EntityKind::Schedule;
            let (_, schedules) = repo
                .list_records(RecordListQuery::new(kind))
                .map_err(|err| {
                    log::error!("Failed to list {kind}: {err}");
                    err
                })?;

            let ctx = DescriptorContext::new(DialogMode::Create, settings.today)
                .with_options(load_reference_options(repo, kind)?)
                .with_date_format(settings.date_format.clone());
            let columns = definition(kind).columns(&ctx);
            let records: Vec<EntityRecord> = schedules
                .iter()
                .map(|record| record.to_entity_record())
                .collect();

            Ok(DashboardPageData {
                role,
                cards: Vec::new(),
                timetable: Some(Table::new(&columns, &records).render()),
            })
        }
    }
}
