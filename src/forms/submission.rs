//! Urlencoded dialog submissions.

use serde::Serialize;

use crate::domain::types::RecordId;
use crate::forms::FormError;
use crate::table::AssignKind;

/// Hidden field naming the dialog a submission belongs to.
pub const TARGET_FIELD: &str = "_target";
/// Hidden field carrying the edited record id.
pub const ID_FIELD: &str = "_id";
/// Hidden field carrying the assignment action slug.
pub const ACTION_FIELD: &str = "_action";

/// Which dialog produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTarget {
    Create,
    Edit(RecordId),
    Assign(RecordId, AssignKind),
}

/// Name/value pair rendered as a hidden input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenField {
    pub name: &'static str,
    pub value: String,
}

impl DialogTarget {
    /// Hidden inputs that let [`DialogSubmission::parse`] recover the target.
    pub fn hidden_fields(&self) -> Vec<HiddenField> {
        let field = |name, value: String| HiddenField { name, value };
        match self {
            DialogTarget::Create => vec![field(TARGET_FIELD, "create".to_string())],
            DialogTarget::Edit(id) => vec![
                field(TARGET_FIELD, "edit".to_string()),
                field(ID_FIELD, id.to_string()),
            ],
            DialogTarget::Assign(id, action) => vec![
                field(TARGET_FIELD, "assign".to_string()),
                field(ID_FIELD, id.to_string()),
                field(ACTION_FIELD, action.slug().to_string()),
            ],
        }
    }
}

/// A posted dialog: its target plus the raw field pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSubmission {
    pub target: DialogTarget,
    pub pairs: Vec<(String, String)>,
}

impl DialogSubmission {
    /// Parses an `application/x-www-form-urlencoded` body.
    pub fn parse(body: &str) -> Result<Self, FormError> {
        let pairs: Vec<(String, String)> =
            serde_html_form::from_str(body).map_err(|err| FormError::Payload(err.to_string()))?;

        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let record_id = || -> Result<RecordId, FormError> {
            let raw = lookup(ID_FIELD).ok_or(FormError::InvalidTarget)?;
            let id = raw.trim().parse::<i32>().map_err(|_| FormError::InvalidTarget)?;
            RecordId::new(id).map_err(|_| FormError::InvalidTarget)
        };

        let target = match lookup(TARGET_FIELD) {
            Some("create") => DialogTarget::Create,
            Some("edit") => DialogTarget::Edit(record_id()?),
            Some("assign") => {
                let action = lookup(ACTION_FIELD)
                    .and_then(AssignKind::from_slug)
                    .ok_or(FormError::InvalidTarget)?;
                DialogTarget::Assign(record_id()?, action)
            }
            _ => return Err(FormError::InvalidTarget),
        };

        let pairs = pairs
            .into_iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .collect();

        Ok(Self { target, pairs })
    }
}
