//! DTOs used by the management pages and their dialogs.

use serde::{Deserialize, Serialize};

use crate::dialog::DialogView;
use crate::forms::submission::HiddenField;
use crate::pagination::Pager;
use crate::table::RenderedTable;

/// Query string of a management page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ManageQuery {
    /// Name filter entered by the user.
    pub q: Option<String>,
    pub page: Option<usize>,
}

/// Data required to render a management table page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagementPageData {
    pub slug: &'static str,
    pub title: &'static str,
    pub table: RenderedTable,
    pub pager: Pager,
    pub total: usize,
    pub search_query: Option<String>,
}

/// Data required to render a create, edit or assignment dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogPageData {
    pub slug: &'static str,
    pub title: String,
    pub action_url: String,
    pub cancel_url: String,
    pub hidden_fields: Vec<HiddenField>,
    pub dialog: DialogView,
}

/// Result of posting a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// Saved; carries the confirmation shown after the redirect.
    Saved(String),
    /// Kept open with errors; the dialog is rendered again.
    Rejected(Box<DialogPageData>),
}
