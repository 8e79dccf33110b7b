//! Entity catalogue.
//!
//! Every managed entity kind exposes pure descriptor factories driven by an
//! explicit [`DescriptorContext`], its validation schema and the row actions
//! offered by its management table.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::descriptors::{
    ColumnDescriptor, FieldDescriptor, SelectOption, display_renderer, option_label_renderer,
};
use crate::dialog::DialogMode;
use crate::domain::record::DEFAULT_DATE_FORMAT;
use crate::domain::types::EntityKind;
use crate::forms::validation::{Rule, RuleSchema, Validator};
use crate::table::{AssignKind, RowAction};

pub mod benefit;
pub mod branch;
pub mod facility;
pub mod room;
pub mod schedule;
pub mod staff;
pub mod student;

/// Reference data used to fill select fields, one list per entity kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceOptions {
    pub branches: Vec<SelectOption>,
    pub facilities: Vec<SelectOption>,
    pub rooms: Vec<SelectOption>,
    pub staff: Vec<SelectOption>,
    pub benefits: Vec<SelectOption>,
}

impl ReferenceOptions {
    /// Options listing records of `kind`; empty for kinds never referenced.
    pub fn for_kind(&self, kind: EntityKind) -> &[SelectOption] {
        match kind {
            EntityKind::Branch => &self.branches,
            EntityKind::Facility => &self.facilities,
            EntityKind::Room => &self.rooms,
            EntityKind::Staff => &self.staff,
            EntityKind::Benefit => &self.benefits,
            EntityKind::Student | EntityKind::Schedule => &[],
        }
    }

    pub fn set(&mut self, kind: EntityKind, options: Vec<SelectOption>) {
        match kind {
            EntityKind::Branch => self.branches = options,
            EntityKind::Facility => self.facilities = options,
            EntityKind::Room => self.rooms = options,
            EntityKind::Staff => self.staff = options,
            EntityKind::Benefit => self.benefits = options,
            EntityKind::Student | EntityKind::Schedule => {
                log::warn!("Ignoring reference options for {kind}");
            }
        }
    }
}

/// Everything a descriptor factory may depend on.
#[derive(Clone, Debug, PartialEq)]
pub struct DescriptorContext {
    pub mode: DialogMode,
    pub submitting: bool,
    pub loading: bool,
    pub options: ReferenceOptions,
    /// `strftime` pattern of dates in read views.
    pub date_format: String,
    /// Reference date for age checks.
    pub today: NaiveDate,
}

impl DescriptorContext {
    pub fn new(mode: DialogMode, today: NaiveDate) -> Self {
        Self {
            mode,
            submitting: false,
            loading: false,
            options: ReferenceOptions::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            today,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReferenceOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    #[must_use]
    pub fn submitting(mut self, submitting: bool) -> Self {
        self.submitting = submitting;
        self
    }

    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn is_create(&self) -> bool {
        self.mode == DialogMode::Create
    }

    /// Inputs are read-only while data loads or a write is in flight.
    pub fn inputs_locked(&self) -> bool {
        self.submitting || self.loading
    }

    /// Select over the records of `kind`, with a loading hint while options
    /// are being fetched.
    pub fn reference_select(
        &self,
        name: &str,
        label: &str,
        kind: EntityKind,
    ) -> FieldDescriptor {
        let options = self.options.for_kind(kind).to_vec();
        let placeholder = if self.loading {
            "Đang tải...".to_string()
        } else if options.is_empty() {
            format!("Chưa có {}", kind.title().to_lowercase())
        } else {
            format!("Chọn {}", label.to_lowercase())
        };
        FieldDescriptor::select(name, label, options)
            .placeholder(placeholder)
            .disabled(self.inputs_locked())
    }

    /// Column showing the label of the referenced record instead of its id.
    pub fn reference_column(&self, key: &str, header: &str, kind: EntityKind) -> ColumnDescriptor {
        ColumnDescriptor::new(key, header)
            .renderer(option_label_renderer(self.options.for_kind(kind).to_vec()))
    }

    /// Column formatting dates and booleans for read views.
    pub fn display_column(&self, key: &str, header: &str) -> ColumnDescriptor {
        ColumnDescriptor::new(key, header).renderer(display_renderer(self.date_format.clone()))
    }

    /// Applies the context-wide lock to hand-built descriptors.
    pub fn lock(&self, fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
        let locked = self.inputs_locked();
        fields
            .into_iter()
            .map(|field| {
                let disabled = field.disabled || locked;
                field.disabled(disabled)
            })
            .collect()
    }
}

/// Catalogue entry of one entity kind.
pub trait EntityDefinition: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Form fields of the create/edit dialog.
    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor>;

    /// Columns of the management table.
    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor>;

    fn validator(&self, ctx: &DescriptorContext) -> Arc<dyn Validator>;

    fn row_actions(&self) -> Vec<RowAction> {
        vec![RowAction::Edit, RowAction::Delete]
    }

    /// Kinds whose option lists the descriptors need.
    fn references(&self) -> &'static [EntityKind] {
        &[]
    }

    /// Select used by an assignment action, when the kind supports it.
    fn assignment(&self, _action: AssignKind, _ctx: &DescriptorContext) -> Option<FieldDescriptor> {
        None
    }
}

/// Catalogue entry for `kind`.
pub fn definition(kind: EntityKind) -> &'static dyn EntityDefinition {
    match kind {
        EntityKind::Branch => &branch::BranchDefinition,
        EntityKind::Facility => &facility::FacilityDefinition,
        EntityKind::Room => &room::RoomDefinition,
        EntityKind::Staff => &staff::StaffDefinition,
        EntityKind::Student => &student::StudentDefinition,
        EntityKind::Benefit => &benefit::BenefitDefinition,
        EntityKind::Schedule => &schedule::ScheduleDefinition,
    }
}

/// Reduced form of an assignment action: the select and a schema requiring it.
pub fn assignment_form(
    kind: EntityKind,
    action: AssignKind,
    ctx: &DescriptorContext,
) -> Option<(Vec<FieldDescriptor>, Arc<dyn Validator>)> {
    let entity = definition(kind);
    if !entity.row_actions().contains(&RowAction::Assign(action)) {
        return None;
    }
    let field = entity.assignment(action, ctx)?.required();
    let schema = RuleSchema::new().field(field.name.clone(), vec![Rule::Required]);
    Some((vec![field], Arc::new(schema)))
}

/// Dialog heading for `kind` in `mode`.
pub fn dialog_title(kind: EntityKind, mode: DialogMode) -> String {
    let title = kind.title().to_lowercase();
    match mode {
        DialogMode::Create => format!("Thêm {title}"),
        DialogMode::Edit => format!("Cập nhật {title}"),
    }
}
