//! Generic table rendering with per-row action triggers.

use serde::Serialize;
use thiserror::Error;

use crate::descriptors::{Align, ColumnDescriptor};
use crate::domain::record::EntityRecord;

/// Domain specific assignment performed from a table row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignKind {
    /// Attach a staff member to a branch.
    Branch,
    /// Attach a room to a facility.
    Facility,
    /// Grant a benefit to a student.
    Benefit,
}

impl AssignKind {
    pub const fn slug(self) -> &'static str {
        match self {
            AssignKind::Branch => "branch",
            AssignKind::Facility => "facility",
            AssignKind::Benefit => "benefit",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AssignKind::Branch => "Gán chi nhánh",
            AssignKind::Facility => "Gán cơ sở",
            AssignKind::Benefit => "Gán ưu đãi",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        [AssignKind::Branch, AssignKind::Facility, AssignKind::Benefit]
            .into_iter()
            .find(|kind| kind.slug() == slug)
    }
}

/// Operation offered in the trailing actions column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Edit,
    Delete,
    Assign(AssignKind),
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            RowAction::Edit => "Sửa",
            RowAction::Delete => "Xóa",
            RowAction::Assign(kind) => kind.label(),
        }
    }

    /// Path segment appended to a row's URL, e.g. `assign/branch`.
    pub fn path(self) -> String {
        match self {
            RowAction::Edit => "edit".to_string(),
            RowAction::Delete => "delete".to_string(),
            RowAction::Assign(kind) => format!("assign/{}", kind.slug()),
        }
    }
}

/// Caller-supplied receiver of row action triggers.
///
/// The table never mutates anything itself; it only hands the row over.
pub trait RowActionHandler {
    fn on_edit(&mut self, row: &EntityRecord);

    fn on_delete(&mut self, row: &EntityRecord);

    fn on_assign(&mut self, kind: AssignKind, row: &EntityRecord) {
        let _ = (kind, row);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),
    #[error("action {0:?} is not offered by this table")]
    ActionNotOffered(RowAction),
}

/// Column descriptors and records bound together for one render pass.
pub struct Table<'a> {
    columns: &'a [ColumnDescriptor],
    records: &'a [EntityRecord],
    actions: &'a [RowAction],
}

impl<'a> Table<'a> {
    pub fn new(columns: &'a [ColumnDescriptor], records: &'a [EntityRecord]) -> Self {
        Self {
            columns,
            records,
            actions: &[],
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: &'a [RowAction]) -> Self {
        self.actions = actions;
        self
    }

    /// One row per record, one cell per column, in the given order.
    pub fn render(&self) -> RenderedTable {
        let headers = self
            .columns
            .iter()
            .map(|column| RenderedHeader {
                key: column.key.clone(),
                header: column.header.clone(),
                align: column.align.unwrap_or_default(),
            })
            .collect();

        let rows = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| RenderedRow {
                index,
                id: record.record_id().map(i32::from),
                cells: self
                    .columns
                    .iter()
                    .map(|column| RenderedCell {
                        text: column.render_cell(record),
                        align: column.align.unwrap_or_default(),
                    })
                    .collect(),
                actions: self
                    .actions
                    .iter()
                    .map(|action| RenderedAction {
                        action: *action,
                        label: action.label(),
                        path: action.path(),
                    })
                    .collect(),
            })
            .collect();

        RenderedTable {
            headers,
            rows,
            has_actions: !self.actions.is_empty(),
        }
    }

    /// Hands the record at `row` to `handler` for `action`.
    pub fn trigger(
        &self,
        row: usize,
        action: RowAction,
        handler: &mut dyn RowActionHandler,
    ) -> Result<(), TableError> {
        if !self.actions.contains(&action) {
            return Err(TableError::ActionNotOffered(action));
        }
        let record = self.records.get(row).ok_or(TableError::RowOutOfRange(row))?;

        match action {
            RowAction::Edit => handler.on_edit(record),
            RowAction::Delete => handler.on_delete(record),
            RowAction::Assign(kind) => handler.on_assign(kind, record),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTable {
    pub headers: Vec<RenderedHeader>,
    pub rows: Vec<RenderedRow>,
    pub has_actions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedHeader {
    pub key: String,
    pub header: String,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub index: usize,
    pub id: Option<i32>,
    pub cells: Vec<RenderedCell>,
    pub actions: Vec<RenderedAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCell {
    pub text: String,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAction {
    pub action: RowAction,
    pub label: &'static str,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, EntityRecord)>,
    }

    impl RowActionHandler for Recorder {
        fn on_edit(&mut self, row: &EntityRecord) {
            self.calls.push(("edit".into(), row.clone()));
        }

        fn on_delete(&mut self, row: &EntityRecord) {
            self.calls.push(("delete".into(), row.clone()));
        }

        fn on_assign(&mut self, kind: AssignKind, row: &EntityRecord) {
            self.calls.push((kind.slug().into(), row.clone()));
        }
    }

    fn records() -> Vec<EntityRecord> {
        vec![
            EntityRecord::new().with("id", 1).with("name", "Phòng A1").with("capacity", 10),
            EntityRecord::new().with("id", 2).with("name", "Phòng B2"),
        ]
    }

    #[test]
    fn renders_every_cell_once_per_pass() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let columns = vec![
            ColumnDescriptor::new("name", "Tên"),
            ColumnDescriptor::new("capacity", "Sức chứa")
                .align(Align::Right)
                .render(move |value, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if value.is_empty() { "-".into() } else { value.to_string() }
                }),
        ];
        let records = records();

        let rendered = Table::new(&columns, &records).render();

        assert_eq!(rendered.headers.len(), 2);
        assert_eq!(rendered.rows.len(), 2);
        assert!(rendered.rows.iter().all(|row| row.cells.len() == 2));
        assert_eq!(rendered.rows[0].cells[1].text, "10");
        assert_eq!(rendered.rows[1].cells[1].text, "-");
        assert_eq!(rendered.rows[1].cells[1].align, Align::Right);
        assert_eq!(rendered.rows[1].id, Some(2));
        assert!(!rendered.has_actions);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn trigger_passes_the_row_record_to_the_handler() {
        let columns = vec![ColumnDescriptor::new("name", "Tên")];
        let records = records();
        let actions = [
            RowAction::Edit,
            RowAction::Delete,
            RowAction::Assign(AssignKind::Facility),
        ];
        let table = Table::new(&columns, &records).with_actions(&actions);
        let mut recorder = Recorder::default();

        table.trigger(1, RowAction::Edit, &mut recorder).unwrap();
        table
            .trigger(0, RowAction::Assign(AssignKind::Facility), &mut recorder)
            .unwrap();

        assert_eq!(recorder.calls[0], ("edit".to_string(), records[1].clone()));
        assert_eq!(recorder.calls[1], ("facility".to_string(), records[0].clone()));
        assert_eq!(table.render().rows[0].actions.len(), 3);
    }

    #[test]
    fn trigger_rejects_unknown_rows_and_actions() {
        let columns = vec![ColumnDescriptor::new("name", "Tên")];
        let records = records();
        let actions = [RowAction::Edit];
        let table = Table::new(&columns, &records).with_actions(&actions);
        let mut recorder = Recorder::default();

        assert_eq!(
            table.trigger(5, RowAction::Edit, &mut recorder),
            Err(TableError::RowOutOfRange(5))
        );
        assert_eq!(
            table.trigger(0, RowAction::Delete, &mut recorder),
            Err(TableError::ActionNotOffered(RowAction::Delete))
        );
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn assign_slugs_round_trip() {
        for kind in [AssignKind::Branch, AssignKind::Facility, AssignKind::Benefit] {
            assert_eq!(AssignKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(AssignKind::from_slug("room"), None);
    }
}
