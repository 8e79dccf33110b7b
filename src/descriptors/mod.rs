//! Data-only descriptions of form fields and table columns.
//!
//! Descriptors are produced by pure factory functions (see [`crate::entities`])
//! and consumed by the generic form renderer and table renderer. They carry no
//! behaviour besides the optional, side-effect free column `render` function.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::record::{EntityRecord, FieldValue};

/// Width of a full layout row.
pub const GRID_COLUMNS: u8 = 12;

/// Default visible line count of a textarea.
pub const DEFAULT_TEXTAREA_ROWS: u8 = 3;

/// Input kind rendered for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Password,
    Number,
    Select,
    Switch,
    Date,
}

impl FieldType {
    /// `type` attribute of the HTML input backing this field.
    pub const fn html_input_type(self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Textarea | FieldType::Select => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Switch => "checkbox",
            FieldType::Date => "date",
        }
    }
}

/// One `{value, label}` pair of a select field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Describes one input of a form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub section: Option<String>,
    pub section_description: Option<String>,
    pub grid_size: u8,
    pub rows: u8,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            options: Vec::new(),
            disabled: false,
            placeholder: None,
            helper_text: None,
            section: None,
            section_description: None,
            grid_size: GRID_COLUMNS,
            rows: DEFAULT_TEXTAREA_ROWS,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Text)
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Textarea)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Email)
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Password)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Number)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        let mut descriptor = Self::new(name, label, FieldType::Select);
        descriptor.options = options;
        descriptor
    }

    pub fn switch(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Switch)
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::Date)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn helper_text(mut self, helper_text: impl Into<String>) -> Self {
        self.helper_text = Some(helper_text.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn section_description(mut self, description: impl Into<String>) -> Self {
        self.section_description = Some(description.into());
        self
    }

    /// Relative width on a 12-unit row, clamped to `1..=12`.
    #[must_use]
    pub fn grid_size(mut self, grid_size: u8) -> Self {
        self.grid_size = grid_size.clamp(1, GRID_COLUMNS);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: u8) -> Self {
        self.rows = rows.max(1);
        self
    }

    /// Label of the option whose value equals `value`.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }

    /// A required select without options cannot be satisfied by the user.
    pub fn is_unsatisfiable_select(&self) -> bool {
        self.field_type == FieldType::Select && self.required && self.options.is_empty()
    }
}

/// Problems found when checking a descriptor sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorIssue {
    /// Two descriptors share the same `name`.
    DuplicateName(String),
    /// A required select has nothing to choose from.
    EmptyRequiredSelect(String),
}

/// Lists every issue of `descriptors` in declaration order.
pub fn check_field_descriptors(descriptors: &[FieldDescriptor]) -> Vec<DescriptorIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for descriptor in descriptors {
        if !seen.insert(descriptor.name.as_str()) {
            issues.push(DescriptorIssue::DuplicateName(descriptor.name.clone()));
        }
        if descriptor.is_unsatisfiable_select() {
            issues.push(DescriptorIssue::EmptyRequiredSelect(
                descriptor.name.clone(),
            ));
        }
    }

    issues
}

/// Text alignment hint of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Pure cell formatter: raw value and owning row in, display text out.
pub type CellRenderer = Arc<dyn Fn(&FieldValue, &EntityRecord) -> String + Send + Sync>;

/// Describes one column of a table.
#[derive(Clone)]
pub struct ColumnDescriptor {
    pub key: String,
    pub header: String,
    pub render: Option<CellRenderer>,
    pub align: Option<Align>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            render: None,
            align: None,
        }
    }

    #[must_use]
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&FieldValue, &EntityRecord) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Attaches an already shared renderer such as [`option_label_renderer`].
    #[must_use]
    pub fn renderer(mut self, render: CellRenderer) -> Self {
        self.render = Some(render);
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Display text of this column for `row`.
    pub fn render_cell(&self, row: &EntityRecord) -> String {
        let value = row.value(&self.key);
        match &self.render {
            Some(render) => render(value, row),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .field("align", &self.align)
            .finish()
    }
}

/// Column renderer resolving a stored option value to its label.
pub fn option_label_renderer(options: Vec<SelectOption>) -> CellRenderer {
    Arc::new(move |value, _row| {
        let raw = value.to_string();
        options
            .iter()
            .find(|option| option.value == raw)
            .map(|option| option.label.clone())
            .unwrap_or(raw)
    })
}

/// Column renderer formatting dates (and booleans) for read views.
pub fn display_renderer(date_format: impl Into<String>) -> CellRenderer {
    let date_format = date_format.into();
    Arc::new(move |value, _row| value.display_with(&date_format))
}
