//! Descriptor-driven forms: state, rendering and validation.

use thiserror::Error;

pub mod renderer;
#[cfg(feature = "server")]
pub mod submission;
pub mod validation;

pub use renderer::{FormState, RenderedForm};
pub use validation::{ErrorKind, FieldError, ValidationErrors, Validator};

#[derive(Debug, Error)]
/// Errors that can occur when building or feeding a form.
pub enum FormError {
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("malformed form payload: {0}")]
    Payload(String),

    #[error("unknown dialog target")]
    InvalidTarget,
}
