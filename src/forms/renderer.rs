//! Generic, descriptor-driven form state and its render model.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::descriptors::{
    DescriptorIssue, FieldDescriptor, FieldType, check_field_descriptors,
};
use crate::domain::record::{EntityRecord, FieldValue};
use crate::forms::FormError;
use crate::forms::validation::{FORM_ERROR_KEY, FieldError, ValidationErrors, Validator};

/// Permissive numeric coercion: blank or non-numeric input becomes `0`.
pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

fn parse_switch(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

fn parse_date(raw: &str) -> FieldValue {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(FieldValue::Date)
        .unwrap_or(FieldValue::Null)
}

/// Maps raw text typed into the input of `descriptor` onto a typed value.
fn coerce_input(descriptor: &FieldDescriptor, raw: &str) -> FieldValue {
    match descriptor.field_type {
        FieldType::Number => FieldValue::Number(coerce_number(raw)),
        FieldType::Switch => FieldValue::Bool(parse_switch(raw)),
        FieldType::Date => parse_date(raw),
        FieldType::Select => resolve_option(descriptor, raw.trim()),
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Email
        | FieldType::Password => FieldValue::Text(raw.to_string()),
    }
}

/// Select values only survive when they name one of the options.
fn resolve_option(descriptor: &FieldDescriptor, raw: &str) -> FieldValue {
    descriptor
        .options
        .iter()
        .find(|option| option.value == raw)
        .map(|option| FieldValue::Text(option.value.clone()))
        .unwrap_or(FieldValue::Null)
}

/// Brings an already typed value in line with the field type.
fn normalize_value(descriptor: &FieldDescriptor, value: &FieldValue) -> FieldValue {
    match (descriptor.field_type, value) {
        (FieldType::Number, FieldValue::Number(number)) => FieldValue::Number(*number),
        (FieldType::Number, FieldValue::Null) => FieldValue::Number(0.0),
        (FieldType::Switch, FieldValue::Bool(flag)) => FieldValue::Bool(*flag),
        (FieldType::Switch, FieldValue::Null) => FieldValue::Bool(false),
        (FieldType::Switch, FieldValue::Number(number)) => FieldValue::Bool(*number != 0.0),
        (FieldType::Date, FieldValue::Date(date)) => FieldValue::Date(*date),
        (FieldType::Date, FieldValue::Null) => FieldValue::Null,
        (FieldType::Select, FieldValue::Null) => FieldValue::Null,
        (FieldType::Select, other) => resolve_option(descriptor, &other.to_input_value()),
        (_, FieldValue::Null) => FieldValue::Text(String::new()),
        (_, other) => coerce_input(descriptor, &other.to_input_value()),
    }
}

/// In-progress state of one form: descriptors, edited values and the validator.
pub struct FormState {
    descriptors: Vec<FieldDescriptor>,
    values: EntityRecord,
    validator: Arc<dyn Validator>,
}

impl FormState {
    /// Seeds the form from `initial`; keys without a descriptor are ignored.
    ///
    /// Fails when two descriptors share a name. A required select without
    /// options is kept but disabled.
    pub fn new(
        mut descriptors: Vec<FieldDescriptor>,
        initial: &EntityRecord,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, FormError> {
        for issue in check_field_descriptors(&descriptors) {
            match issue {
                DescriptorIssue::DuplicateName(name) => {
                    return Err(FormError::DuplicateField(name));
                }
                DescriptorIssue::EmptyRequiredSelect(name) => {
                    log::warn!("Required select `{name}` has no options");
                }
            }
        }

        for descriptor in &mut descriptors {
            if descriptor.is_unsatisfiable_select() {
                descriptor.disabled = true;
            }
        }

        let values = descriptors
            .iter()
            .map(|descriptor| {
                (
                    descriptor.name.clone(),
                    normalize_value(descriptor, initial.value(&descriptor.name)),
                )
            })
            .collect();

        Ok(Self {
            descriptors,
            values,
            validator,
        })
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    fn descriptor(&self, name: &str) -> Result<&FieldDescriptor, FormError> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Current edited values, one entry per descriptor.
    pub fn values(&self) -> EntityRecord {
        self.values.clone()
    }

    pub fn value(&self, name: &str) -> &FieldValue {
        self.values.value(name)
    }

    /// Applies text typed into the input named `name`.
    pub fn set_input(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let value = coerce_input(self.descriptor(name)?, raw);
        self.values.insert(name, value);
        Ok(())
    }

    /// Applies an already typed value to the field named `name`.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let value = normalize_value(self.descriptor(name)?, &value.into());
        self.values.insert(name, value);
        Ok(())
    }

    /// Applies an urlencoded submission.
    ///
    /// Disabled fields keep their value since browsers do not post them; an
    /// enabled switch missing from the payload is switched off. Unknown keys
    /// are ignored.
    pub fn apply_form_data(&mut self, pairs: &[(String, String)]) {
        let updates = self
            .descriptors
            .iter()
            .filter(|descriptor| !descriptor.disabled)
            .filter_map(|descriptor| {
                let posted = pairs
                    .iter()
                    .rev()
                    .find(|(key, _)| *key == descriptor.name)
                    .map(|(_, value)| value.as_str());
                match (descriptor.field_type, posted) {
                    (_, Some(raw)) => Some((descriptor.name.clone(), coerce_input(descriptor, raw))),
                    (FieldType::Switch, None) => {
                        Some((descriptor.name.clone(), FieldValue::Bool(false)))
                    }
                    (_, None) => None,
                }
            })
            .collect::<Vec<_>>();

        for (name, value) in updates {
            self.values.insert(name, value);
        }
    }

    /// Runs the validator against the current values.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.validator.validate(&self.values)
    }

    /// Validated payload whose keys match the descriptor names.
    pub fn submit(&self) -> Result<EntityRecord, ValidationErrors> {
        self.validate()?;
        Ok(self.values())
    }

    /// Builds the render model, attaching `errors` to their fields.
    pub fn render(&self, errors: &ValidationErrors) -> RenderedForm {
        let mut sections: Vec<RenderedSection> = Vec::new();

        for descriptor in &self.descriptors {
            let field = self.render_field(descriptor, errors.get(&descriptor.name));
            match sections
                .iter_mut()
                .find(|section| section.title == descriptor.section)
            {
                Some(section) => {
                    if section.description.is_none() {
                        section.description = descriptor.section_description.clone();
                    }
                    section.fields.push(field);
                }
                None => sections.push(RenderedSection {
                    title: descriptor.section.clone(),
                    description: descriptor.section_description.clone(),
                    fields: vec![field],
                }),
            }
        }

        let form_errors = errors
            .iter()
            .filter(|(name, _)| {
                *name == FORM_ERROR_KEY
                    || !self
                        .descriptors
                        .iter()
                        .any(|descriptor| descriptor.name == *name)
            })
            .map(|(_, error)| error.message.clone())
            .collect();

        RenderedForm {
            field_count: self.descriptors.len(),
            sections,
            form_errors,
        }
    }

    fn render_field(&self, descriptor: &FieldDescriptor, error: Option<&FieldError>) -> RenderedField {
        let value = self.value(&descriptor.name);
        let input = match descriptor.field_type {
            FieldType::Textarea => RenderedInput::Textarea {
                rows: descriptor.rows,
                value: value.to_input_value(),
            },
            FieldType::Select => {
                let selected = value.as_text().map(str::to_string);
                RenderedInput::Select {
                    options: descriptor
                        .options
                        .iter()
                        .map(|option| RenderedOption {
                            value: option.value.clone(),
                            label: option.label.clone(),
                            selected: selected.as_deref() == Some(option.value.as_str()),
                        })
                        .collect(),
                    selected,
                }
            }
            FieldType::Switch => RenderedInput::Switch {
                checked: value.as_bool().unwrap_or(false),
            },
            FieldType::Date => RenderedInput::Date {
                value: value.to_input_value(),
            },
            FieldType::Text | FieldType::Email | FieldType::Password | FieldType::Number => {
                RenderedInput::Line {
                    input_type: descriptor.field_type.html_input_type(),
                    value: if descriptor.field_type == FieldType::Password {
                        String::new()
                    } else {
                        value.to_input_value()
                    },
                }
            }
        };

        RenderedField {
            name: descriptor.name.clone(),
            label: descriptor.label.clone(),
            input,
            required: descriptor.required,
            disabled: descriptor.disabled,
            placeholder: descriptor.placeholder.clone(),
            helper_text: descriptor.helper_text.clone(),
            grid_size: descriptor.grid_size,
            error: error.cloned(),
        }
    }
}

/// Render model of a whole form, ready for a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedForm {
    pub field_count: usize,
    pub sections: Vec<RenderedSection>,
    /// Errors not attached to any rendered field.
    pub form_errors: Vec<String>,
}

impl RenderedForm {
    pub fn fields(&self) -> impl Iterator<Item = &RenderedField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields().find(|field| field.name == name)
    }
}

/// Fields sharing one `section`, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub input: RenderedInput,
    pub required: bool,
    pub disabled: bool,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub grid_size: u8,
    pub error: Option<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedInput {
    Line {
        input_type: &'static str,
        value: String,
    },
    Textarea {
        rows: u8,
        value: String,
    },
    Select {
        options: Vec<RenderedOption>,
        selected: Option<String>,
    },
    Switch {
        checked: bool,
    },
    Date {
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::SelectOption;
    use crate::forms::validation::{AcceptAll, ErrorKind, Rule, RuleSchema};

    fn room_descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::text("name", "Tên phòng").required().section("Thông tin"),
            FieldDescriptor::number("capacity", "Sức chứa").section("Thông tin"),
            FieldDescriptor::select(
                "facility_id",
                "Cơ sở",
                vec![SelectOption::new("1", "Cơ sở 1"), SelectOption::new("2", "Cơ sở 2")],
            )
            .section("Vị trí")
            .section_description("Nơi đặt phòng"),
            FieldDescriptor::switch("is_active", "Đang hoạt động"),
            FieldDescriptor::textarea("note", "Ghi chú").rows(5).section("Thông tin"),
        ]
    }

    fn room_schema() -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("name", vec![Rule::Required])
                .field("facility_id", vec![Rule::Required]),
        )
    }

    #[test]
    fn renders_one_field_per_descriptor_grouped_by_first_section_appearance() {
        let form = FormState::new(room_descriptors(), &EntityRecord::new(), room_schema()).unwrap();
        let rendered = form.render(&ValidationErrors::new());

        assert_eq!(rendered.field_count, 5);
        assert_eq!(rendered.fields().count(), 5);
        let titles: Vec<_> = rendered.sections.iter().map(|s| s.title.clone()).collect();
        assert_eq!(
            titles,
            vec![Some("Thông tin".to_string()), Some("Vị trí".to_string()), None]
        );
        let info: Vec<_> = rendered.sections[0].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(info, vec!["name", "capacity", "note"]);
        assert_eq!(rendered.sections[1].description.as_deref(), Some("Nơi đặt phòng"));
        assert_eq!(
            rendered.field("note").unwrap().input,
            RenderedInput::Textarea {
                rows: 5,
                value: String::new()
            }
        );
    }

    #[test]
    fn number_input_coerces_blank_and_garbage_to_zero() {
        let mut form =
            FormState::new(room_descriptors(), &EntityRecord::new(), room_schema()).unwrap();

        form.set_input("capacity", "").unwrap();
        assert_eq!(form.value("capacity"), &FieldValue::Number(0.0));
        form.set_input("capacity", "mười").unwrap();
        assert_eq!(form.value("capacity"), &FieldValue::Number(0.0));
        form.set_input("capacity", " 12 ").unwrap();
        assert_eq!(form.value("capacity"), &FieldValue::Number(12.0));
    }

    #[test]
    fn switch_defaults_to_false_and_select_drops_unknown_values() {
        let initial = EntityRecord::new().with("facility_id", 9);
        let form = FormState::new(room_descriptors(), &initial, room_schema()).unwrap();

        assert_eq!(form.value("is_active"), &FieldValue::Bool(false));
        assert_eq!(form.value("facility_id"), &FieldValue::Null);
        match &form.render(&ValidationErrors::new()).field("facility_id").unwrap().input {
            RenderedInput::Select { selected, options } => {
                assert!(selected.is_none());
                assert!(options.iter().all(|option| !option.selected));
            }
            other => panic!("unexpected input {other:?}"),
        }

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("facility_id").unwrap().kind, ErrorKind::Required);
    }

    #[test]
    fn stored_numeric_reference_selects_matching_option() {
        let initial = EntityRecord::new().with("facility_id", 2);
        let form = FormState::new(room_descriptors(), &initial, room_schema()).unwrap();
        assert_eq!(form.value("facility_id"), &FieldValue::from("2"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let descriptors = vec![
            FieldDescriptor::text("name", "Tên"),
            FieldDescriptor::text("name", "Tên"),
        ];
        let result = FormState::new(descriptors, &EntityRecord::new(), Arc::new(AcceptAll));
        assert!(matches!(result, Err(FormError::DuplicateField(name)) if name == "name"));
    }

    #[test]
    fn required_select_without_options_is_disabled() {
        let descriptors =
            vec![FieldDescriptor::select("branch_id", "Chi nhánh", Vec::new()).required()];
        let form = FormState::new(descriptors, &EntityRecord::new(), Arc::new(AcceptAll)).unwrap();
        assert!(form.descriptors()[0].disabled);
    }

    #[test]
    fn apply_form_data_handles_switches_and_disabled_fields() {
        let mut descriptors = room_descriptors();
        descriptors[0] = descriptors[0].clone().disabled(true);
        let initial = EntityRecord::new().with("name", "Phòng cũ").with("is_active", true);
        let mut form = FormState::new(descriptors, &initial, room_schema()).unwrap();

        form.apply_form_data(&[
            ("name".to_string(), "Bị bỏ qua".to_string()),
            ("capacity".to_string(), "20".to_string()),
            ("facility_id".to_string(), "1".to_string()),
            ("unknown".to_string(), "x".to_string()),
        ]);

        assert_eq!(form.value("name"), &FieldValue::from("Phòng cũ"));
        assert_eq!(form.value("capacity"), &FieldValue::Number(20.0));
        assert_eq!(form.value("facility_id"), &FieldValue::from("1"));
        assert_eq!(form.value("is_active"), &FieldValue::Bool(false));
        assert!(!form.values().contains_key("unknown"));
    }

    #[test]
    fn render_attaches_errors_and_hides_passwords() {
        let descriptors = vec![
            FieldDescriptor::text("name", "Tên").required(),
            FieldDescriptor::password("password", "Mật khẩu"),
        ];
        let initial = EntityRecord::new().with("password", "secret");
        let form = FormState::new(
            descriptors,
            &initial,
            Arc::new(RuleSchema::new().field("name", vec![Rule::Required])),
        )
        .unwrap();

        let mut errors = form.validate().unwrap_err();
        errors.add(FORM_ERROR_KEY, FieldError::invalid("Dữ liệu không đọc được"));
        let rendered = form.render(&errors);

        assert_eq!(
            rendered.field("name").unwrap().error,
            Some(FieldError::required())
        );
        assert_eq!(rendered.form_errors, vec!["Dữ liệu không đọc được".to_string()]);
        assert_eq!(
            rendered.field("password").unwrap().input,
            RenderedInput::Line {
                input_type: "password",
                value: String::new()
            }
        );
    }

    #[test]
    fn submit_returns_values_keyed_by_descriptor_name() {
        let mut form =
            FormState::new(room_descriptors(), &EntityRecord::new(), room_schema()).unwrap();
        form.set_input("name", "Phòng A1").unwrap();
        form.set_input("facility_id", "2").unwrap();

        let payload = form.submit().unwrap();
        let keys: Vec<_> = payload.keys().collect();
        assert_eq!(keys, vec!["capacity", "facility_id", "is_active", "name", "note"]);
        assert!(matches!(
            form.set_input("missing", "1"),
            Err(FormError::UnknownField(_))
        ));
    }
}
