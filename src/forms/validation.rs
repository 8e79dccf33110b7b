//! Validation capability, error taxonomy and the rule-based schema.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::record::{EntityRecord, FieldValue};
use crate::domain::types::{normalize_email, normalize_phone_to_e164};

/// Error key used for problems not attributable to a single field.
pub const FORM_ERROR_KEY: &str = "_form";

pub const MSG_REQUIRED: &str = "Trường này là bắt buộc";
pub const MSG_INVALID_EMAIL: &str = "Email không hợp lệ";
pub const MSG_INVALID_PHONE: &str = "Số điện thoại không hợp lệ";
pub const MSG_INVALID_NUMBER: &str = "Giá trị phải là một số";

/// Category of a validation or submission problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required value is missing.
    Required,
    /// A present value breaks a format, range or cross-field rule.
    Invalid,
    /// The persistence collaborator rejected the submission.
    SubmitFailed,
}

/// One problem attached to a field, with a message ready for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn required() -> Self {
        Self {
            kind: ErrorKind::Required,
            message: MSG_REQUIRED.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Invalid,
            message: message.into(),
        }
    }

    pub fn submit_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SubmitFailed,
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every field error of one validation pass, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    /// Records `error` unless the field already carries one.
    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.entry(field.into()).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(field, error)| (field.as_str(), error))
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = ValidationErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let Some(error) = field_errors.first() else {
                continue;
            };
            let message = error
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| error.code.to_string());
            let field_error = if error.code == "required" {
                FieldError {
                    kind: ErrorKind::Required,
                    message,
                }
            } else {
                FieldError::invalid(message)
            };
            result.add(field.to_string(), field_error);
        }
        result
    }
}

/// Anything able to decide whether a set of form values is acceptable.
pub trait Validator: Send + Sync {
    /// Checks `values`, collecting every field error instead of stopping at the first.
    fn validate(&self, values: &EntityRecord) -> Result<(), ValidationErrors>;
}

/// Accepts everything; for forms whose checks live entirely elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _values: &EntityRecord) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Single-field rule of a [`RuleSchema`].
#[derive(Clone, Debug)]
pub enum Rule {
    Required,
    /// Character count bounds of the trimmed text.
    Length { min: Option<usize>, max: Option<usize> },
    /// Inclusive numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    Pattern { regex: Regex, message: String },
    Email,
    Phone,
}

impl Rule {
    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Rule::Length { min, max }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Rule::Range { min, max }
    }

    /// Builds a pattern rule; the expression is anchored by the caller.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Rule::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    fn check(&self, value: &FieldValue) -> Option<FieldError> {
        match self {
            Rule::Required => value.is_empty().then(FieldError::required),
            Rule::Length { min, max } => {
                let count = value.to_string().trim().chars().count();
                if let Some(min) = min
                    && count < *min
                {
                    return Some(FieldError::invalid(format!(
                        "Phải có ít nhất {min} ký tự"
                    )));
                }
                if let Some(max) = max
                    && count > *max
                {
                    return Some(FieldError::invalid(format!(
                        "Không được vượt quá {max} ký tự"
                    )));
                }
                None
            }
            Rule::Range { min, max } => {
                let number = match value {
                    FieldValue::Number(number) => *number,
                    FieldValue::Text(text) => match text.trim().parse::<f64>() {
                        Ok(number) => number,
                        Err(_) => return Some(FieldError::invalid(MSG_INVALID_NUMBER)),
                    },
                    _ => return Some(FieldError::invalid(MSG_INVALID_NUMBER)),
                };
                if let Some(min) = min
                    && number < *min
                {
                    return Some(FieldError::invalid(format!(
                        "Giá trị phải lớn hơn hoặc bằng {}",
                        FieldValue::Number(*min)
                    )));
                }
                if let Some(max) = max
                    && number > *max
                {
                    return Some(FieldError::invalid(format!(
                        "Giá trị phải nhỏ hơn hoặc bằng {}",
                        FieldValue::Number(*max)
                    )));
                }
                None
            }
            Rule::Pattern { regex, message } => {
                (!regex.is_match(value.to_string().trim())).then(|| FieldError::invalid(message))
            }
            Rule::Email => normalize_email(value.to_string())
                .err()
                .map(|_| FieldError::invalid(MSG_INVALID_EMAIL)),
            Rule::Phone => normalize_phone_to_e164(&value.to_string())
                .err()
                .map(|_| FieldError::invalid(MSG_INVALID_PHONE)),
        }
    }
}

/// Rule relating two or more fields of the same record.
#[derive(Clone, Debug)]
pub enum CrossFieldRule {
    /// The date in `field` must not precede the date in `other`.
    DateNotBefore {
        field: String,
        other: String,
        message: String,
    },
    /// The `HH:MM` time in `field` must be strictly later than `other`.
    TimeAfter {
        field: String,
        other: String,
        message: String,
    },
    /// The age in `age` must equal the full years elapsed since `birth_date`
    /// at `reference_date`.
    AgeMatchesBirthDate {
        age: String,
        birth_date: String,
        reference_date: NaiveDate,
        message: String,
    },
}

impl CrossFieldRule {
    fn target(&self) -> &str {
        match self {
            CrossFieldRule::DateNotBefore { field, .. } => field,
            CrossFieldRule::TimeAfter { field, .. } => field,
            CrossFieldRule::AgeMatchesBirthDate { age, .. } => age,
        }
    }

    fn check(&self, values: &EntityRecord) -> Option<FieldError> {
        match self {
            CrossFieldRule::DateNotBefore {
                field,
                other,
                message,
            } => {
                let date = values.value(field).as_date()?;
                let other = values.value(other).as_date()?;
                (date < other).then(|| FieldError::invalid(message))
            }
            CrossFieldRule::TimeAfter {
                field,
                other,
                message,
            } => {
                let time = parse_time(values.value(field))?;
                let other = parse_time(values.value(other))?;
                (time <= other).then(|| FieldError::invalid(message))
            }
            CrossFieldRule::AgeMatchesBirthDate {
                age,
                birth_date,
                reference_date,
                message,
            } => {
                let age = values.value(age).as_number()?;
                let birth_date = values.value(birth_date).as_date()?;
                let expected = full_years_between(birth_date, *reference_date)?;
                (age != f64::from(expected)).then(|| FieldError::invalid(message))
            }
        }
    }
}

fn parse_time(value: &FieldValue) -> Option<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(value.as_text()?.trim(), "%H:%M").ok()
}

/// Completed years from `from` to `to`, `None` when `to` precedes `from`.
pub fn full_years_between(from: NaiveDate, to: NaiveDate) -> Option<i32> {
    if to < from {
        return None;
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    Some(years)
}

/// Declarative validation schema: ordered per-field rules plus cross-field rules.
///
/// For each field the first failing rule wins; empty values are only checked
/// by [`Rule::Required`]. Cross-field rules run for fields that passed their
/// own rules.
#[derive(Clone, Debug, Default)]
pub struct RuleSchema {
    fields: Vec<(String, Vec<Rule>)>,
    cross_field: Vec<CrossFieldRule>,
}

impl RuleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.fields.push((name.into(), rules));
        self
    }

    #[must_use]
    pub fn cross_field(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field.push(rule);
        self
    }
}

impl Validator for RuleSchema {
    fn validate(&self, values: &EntityRecord) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (name, rules) in &self.fields {
            let value = values.value(name);
            for rule in rules {
                if value.is_empty() && !matches!(rule, Rule::Required) {
                    continue;
                }
                if let Some(error) = rule.check(value) {
                    errors.add(name.clone(), error);
                    break;
                }
            }
        }

        for rule in &self.cross_field {
            if errors.contains(rule.target()) {
                continue;
            }
            if let Some(error) = rule.check(values) {
                errors.add(rule.target().to_string(), error);
            }
        }

        errors.into_result()
    }
}

/// Adapts any `validator::Validate` form struct to the [`Validator`] capability.
///
/// The record is converted to plain JSON and deserialized into `T`; a
/// deserialization failure is reported under [`FORM_ERROR_KEY`].
pub struct DerivedValidator<T> {
    _form: PhantomData<fn() -> T>,
}

impl<T> DerivedValidator<T> {
    pub fn new() -> Self {
        Self { _form: PhantomData }
    }
}

impl<T> Default for DerivedValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Validator for DerivedValidator<T>
where
    T: DeserializeOwned + Validate,
{
    fn validate(&self, values: &EntityRecord) -> Result<(), ValidationErrors> {
        let form: T = serde_json::from_value(values.to_json()).map_err(|err| {
            log::warn!("Failed to read form values: {err}");
            ValidationErrors::single(FORM_ERROR_KEY, FieldError::invalid(err.to_string()))
        })?;
        form.validate().map_err(ValidationErrors::from)
    }
}
