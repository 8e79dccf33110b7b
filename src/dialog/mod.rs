//! Create/edit dialog state machine.
//!
//! ```text
//! Closed --open_create/open_edit--> Open --begin_submit--> Submitting
//!   ^                                |  ^                      |
//!   +------------- close ------------+  +---- failure ---------+
//!   +------------------------- success ------------------------+
//! ```
//!
//! Each open lifecycle owns exactly one [`FormState`]; changing the subject
//! requires closing and opening again.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::descriptors::FieldDescriptor;
use crate::domain::record::EntityRecord;
use crate::forms::validation::{FieldError, ValidationErrors, Validator};
use crate::forms::{FormError, FormState, RenderedForm};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogMode {
    Create,
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogPhase {
    Closed,
    Open,
    Submitting,
}

/// UI affordance that asked for the dialog to close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseTrigger {
    Cancel,
    CloseButton,
    Backdrop,
}

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("dialog is already open")]
    AlreadyOpen,
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Opaque message shown verbatim to the user.
    #[error("{0}")]
    Rejected(String),
    /// Field-level problems detected on the server side.
    #[error("validation errors: {0}")]
    Invalid(ValidationErrors),
}

/// Caller-supplied create/update operation.
pub trait Persistence {
    fn create(&self, payload: &EntityRecord) -> Result<EntityRecord, SubmitError>;

    fn update(
        &self,
        current: &EntityRecord,
        payload: &EntityRecord,
    ) -> Result<EntityRecord, SubmitError>;
}

/// Callbacks fired at the defined transition points.
pub trait DialogObserver {
    /// `Submitting -> Closed`; receives the submitted payload.
    fn on_success(&mut self, _submitted: &EntityRecord) {}

    /// `Submitting -> Open` after a rejected write.
    fn on_failure(&mut self, _error: &FieldError) {}

    /// `Open -> Closed` through a close trigger.
    fn on_close(&mut self) {}
}

impl DialogObserver for () {}

/// Work handed out by [`DialogOrchestrator::begin_submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub mode: DialogMode,
    /// Record the dialog was opened with (empty for create).
    pub record: EntityRecord,
    pub payload: EntityRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// Validated; the dialog is now `Submitting`.
    Ready(SubmitRequest),
    /// Validation failed; the dialog stays `Open`.
    Invalid(ValidationErrors),
    /// A submission is already in flight.
    Busy,
    NotOpen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Persisted; the dialog is `Closed`. Carries the collaborator's record.
    Saved(EntityRecord),
    /// Client or server validation failed; the dialog is `Open`.
    Invalid(ValidationErrors),
    /// The write was rejected; the dialog is `Open`.
    Failed(FieldError),
    /// Nothing happened (closed, or already submitting).
    Ignored,
}

struct ActiveDialog {
    mode: DialogMode,
    record: EntityRecord,
    form: FormState,
    field_errors: ValidationErrors,
    submit_error: Option<FieldError>,
    pending: Option<EntityRecord>,
}

/// Owns the state of one create/edit dialog.
pub struct DialogOrchestrator {
    phase: DialogPhase,
    active: Option<ActiveDialog>,
}

impl Default for DialogOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogOrchestrator {
    pub fn new() -> Self {
        Self {
            phase: DialogPhase::Closed,
            active: None,
        }
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn mode(&self) -> Option<DialogMode> {
        self.active.as_ref().map(|active| active.mode)
    }

    /// Record the dialog was opened with.
    pub fn active_record(&self) -> Option<&EntityRecord> {
        self.active.as_ref().map(|active| &active.record)
    }

    pub fn form(&self) -> Option<&FormState> {
        self.active.as_ref().map(|active| &active.form)
    }

    /// Editable form; unavailable while a submission is in flight.
    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        if self.phase != DialogPhase::Open {
            return None;
        }
        self.active.as_mut().map(|active| &mut active.form)
    }

    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        self.active.as_ref().map(|active| &active.field_errors)
    }

    pub fn submit_error(&self) -> Option<&FieldError> {
        self.active.as_ref().and_then(|active| active.submit_error.as_ref())
    }

    /// `Closed -> Open(create)` with an empty record.
    pub fn open_create(
        &mut self,
        descriptors: Vec<FieldDescriptor>,
        validator: Arc<dyn Validator>,
    ) -> Result<(), DialogError> {
        self.open(DialogMode::Create, EntityRecord::new(), descriptors, validator)
    }

    /// `Closed -> Open(edit)` with the form pre-populated from `record`.
    pub fn open_edit(
        &mut self,
        record: EntityRecord,
        descriptors: Vec<FieldDescriptor>,
        validator: Arc<dyn Validator>,
    ) -> Result<(), DialogError> {
        self.open(DialogMode::Edit, record, descriptors, validator)
    }

    fn open(
        &mut self,
        mode: DialogMode,
        record: EntityRecord,
        descriptors: Vec<FieldDescriptor>,
        validator: Arc<dyn Validator>,
    ) -> Result<(), DialogError> {
        if self.phase != DialogPhase::Closed {
            return Err(DialogError::AlreadyOpen);
        }

        let form = FormState::new(descriptors, &record, validator)?;
        self.active = Some(ActiveDialog {
            mode,
            record,
            form,
            field_errors: ValidationErrors::new(),
            submit_error: None,
            pending: None,
        });
        self.phase = DialogPhase::Open;
        log::debug!("Dialog opened in {mode:?} mode");
        Ok(())
    }

    /// `Open -> Closed`. Refused while submitting; returns whether it closed.
    pub fn close(&mut self, trigger: CloseTrigger, observer: &mut dyn DialogObserver) -> bool {
        match self.phase {
            DialogPhase::Open => {
                self.reset();
                observer.on_close();
                log::debug!("Dialog closed by {trigger:?}");
                true
            }
            DialogPhase::Submitting => {
                log::debug!("Ignoring {trigger:?} while submitting");
                false
            }
            DialogPhase::Closed => false,
        }
    }

    /// Validates the form and, when valid, moves to `Submitting`.
    pub fn begin_submit(&mut self) -> SubmitStart {
        let phase = self.phase;
        let Some(active) = self.active.as_mut() else {
            return SubmitStart::NotOpen;
        };
        if phase == DialogPhase::Submitting {
            return SubmitStart::Busy;
        }

        match active.form.submit() {
            Ok(payload) => {
                active.field_errors = ValidationErrors::new();
                active.submit_error = None;
                active.pending = Some(payload.clone());
                let request = SubmitRequest {
                    mode: active.mode,
                    record: active.record.clone(),
                    payload,
                };
                self.phase = DialogPhase::Submitting;
                SubmitStart::Ready(request)
            }
            Err(errors) => {
                active.field_errors = errors.clone();
                active.submit_error = None;
                SubmitStart::Invalid(errors)
            }
        }
    }

    /// Resolves an in-flight submission with the collaborator's result.
    pub fn finish_submit(
        &mut self,
        result: Result<EntityRecord, SubmitError>,
        observer: &mut dyn DialogObserver,
    ) -> SubmitOutcome {
        if self.phase != DialogPhase::Submitting {
            return SubmitOutcome::Ignored;
        }
        let Some(active) = self.active.as_mut() else {
            return SubmitOutcome::Ignored;
        };
        let submitted = active.pending.take().unwrap_or_default();

        match result {
            Ok(saved) => {
                self.reset();
                observer.on_success(&submitted);
                SubmitOutcome::Saved(saved)
            }
            Err(SubmitError::Rejected(message)) => {
                let error = FieldError::submit_failed(message);
                active.submit_error = Some(error.clone());
                self.phase = DialogPhase::Open;
                observer.on_failure(&error);
                SubmitOutcome::Failed(error)
            }
            Err(SubmitError::Invalid(errors)) => {
                active.field_errors = errors.clone();
                self.phase = DialogPhase::Open;
                SubmitOutcome::Invalid(errors)
            }
        }
    }

    /// Runs a whole submit cycle against `persistence`.
    pub fn submit(
        &mut self,
        persistence: &dyn Persistence,
        observer: &mut dyn DialogObserver,
    ) -> SubmitOutcome {
        let request = match self.begin_submit() {
            SubmitStart::Ready(request) => request,
            SubmitStart::Invalid(errors) => return SubmitOutcome::Invalid(errors),
            SubmitStart::Busy | SubmitStart::NotOpen => return SubmitOutcome::Ignored,
        };

        let result = match request.mode {
            DialogMode::Create => persistence.create(&request.payload),
            DialogMode::Edit => persistence.update(&request.record, &request.payload),
        };
        if let Err(err) = &result {
            log::error!("Failed to save dialog record: {err}");
        }

        self.finish_submit(result, observer)
    }

    /// Render model of the open dialog.
    pub fn view(&self) -> Option<DialogView> {
        let active = self.active.as_ref()?;
        Some(DialogView {
            mode: active.mode,
            phase: self.phase,
            record_id: active.record.record_id().map(i32::from),
            close_enabled: self.phase == DialogPhase::Open,
            form: active.form.render(&active.field_errors),
            submit_error: active.submit_error.clone(),
        })
    }

    fn reset(&mut self) {
        self.active = None;
        self.phase = DialogPhase::Closed;
    }
}

/// Everything a template needs to draw the dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogView {
    pub mode: DialogMode,
    pub phase: DialogPhase,
    pub record_id: Option<i32>,
    pub close_enabled: bool,
    pub form: RenderedForm,
    pub submit_error: Option<FieldError>,
}
