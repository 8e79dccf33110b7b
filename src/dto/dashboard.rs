//! DTOs used by the role dashboards.

use serde::Serialize;

use crate::domain::types::Role;
use crate::table::RenderedTable;

/// Summary tile linking to one management page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCard {
    pub slug: &'static str,
    pub title: &'static str,
    pub count: usize,
    pub url: String,
}

/// Data required to render the dashboard of the user's primary role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPageData {
    pub role: Role,
    pub cards: Vec<DashboardCard>,
    /// Read-only timetable shown to parents.
    pub timetable: Option<RenderedTable>,
}
