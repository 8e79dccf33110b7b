use std::cell::RefCell;
use std::sync::Arc;

use afterschool_admin::descriptors::FieldDescriptor;
use afterschool_admin::dialog::{
    CloseTrigger, DialogObserver, DialogOrchestrator, DialogPhase, Persistence, SubmitError,
    SubmitOutcome, SubmitStart,
};
use afterschool_admin::domain::record::{EntityRecord, FieldValue};
use afterschool_admin::forms::validation::{ErrorKind, FieldError, Rule, RuleSchema, Validator};

/// Persistence that records every payload and answers with a fixed result.
struct StubPersistence {
    reject_with: Option<String>,
    created: RefCell<Vec<EntityRecord>>,
}

impl StubPersistence {
    fn accepting() -> Self {
        Self {
            reject_with: None,
            created: RefCell::new(Vec::new()),
        }
    }

    fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            created: RefCell::new(Vec::new()),
        }
    }
}

impl Persistence for StubPersistence {
    fn create(&self, payload: &EntityRecord) -> Result<EntityRecord, SubmitError> {
        self.created.borrow_mut().push(payload.clone());
        match &self.reject_with {
            Some(message) => Err(SubmitError::Rejected(message.clone())),
            None => Ok(payload.clone().with("id", 1)),
        }
    }

    fn update(
        &self,
        _current: &EntityRecord,
        payload: &EntityRecord,
    ) -> Result<EntityRecord, SubmitError> {
        Ok(payload.clone())
    }
}

#[derive(Default)]
struct Observer {
    successes: Vec<EntityRecord>,
    failures: Vec<FieldError>,
    closes: usize,
}

impl DialogObserver for Observer {
    fn on_success(&mut self, submitted: &EntityRecord) {
        self.successes.push(submitted.clone());
    }

    fn on_failure(&mut self, error: &FieldError) {
        self.failures.push(error.clone());
    }

    fn on_close(&mut self) {
        self.closes += 1;
    }
}

fn room_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Tên phòng").required(),
        FieldDescriptor::number("capacity", "Sức chứa"),
    ]
}

fn room_schema() -> Arc<dyn Validator> {
    Arc::new(RuleSchema::new().field("name", vec![Rule::Required]))
}

fn open_room_dialog() -> DialogOrchestrator {
    let mut dialog = DialogOrchestrator::new();
    dialog.open_create(room_fields(), room_schema()).unwrap();
    dialog
}

#[test]
fn blank_name_is_required() {
    let mut dialog = open_room_dialog();
    let persistence = StubPersistence::accepting();
    let mut observer = Observer::default();

    dialog.form_mut().unwrap().set_input("name", "   ").unwrap();
    let outcome = dialog.submit(&persistence, &mut observer);

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.get("name").unwrap().kind, ErrorKind::Required);
    assert_eq!(dialog.phase(), DialogPhase::Open);
    assert!(persistence.created.borrow().is_empty());
    assert!(observer.successes.is_empty());

    let view = dialog.view().unwrap();
    assert_eq!(
        view.form.field("name").unwrap().error.as_ref().unwrap().kind,
        ErrorKind::Required
    );
}

#[test]
fn valid_room_is_saved_once() {
    let mut dialog = open_room_dialog();
    let persistence = StubPersistence::accepting();
    let mut observer = Observer::default();

    let form = dialog.form_mut().unwrap();
    form.set_input("name", "Phòng A1").unwrap();
    form.set_input("capacity", "10").unwrap();

    let outcome = dialog.submit(&persistence, &mut observer);

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(observer.successes.len(), 1);
    let submitted = &observer.successes[0];
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted.value("name"), &FieldValue::from("Phòng A1"));
    assert_eq!(submitted.value("capacity"), &FieldValue::Number(10.0));
    assert_eq!(dialog.phase(), DialogPhase::Closed);
    assert!(dialog.view().is_none());
}

#[test]
fn required_select_without_options_cannot_be_satisfied() {
    let mut dialog = DialogOrchestrator::new();
    dialog
        .open_create(
            vec![FieldDescriptor::select("facility_id", "Cơ sở", Vec::new()).required()],
            Arc::new(RuleSchema::new().field("facility_id", vec![Rule::Required])),
        )
        .unwrap();

    let field = dialog.view().unwrap().form.field("facility_id").cloned().unwrap();
    assert!(field.disabled);

    dialog
        .form_mut()
        .unwrap()
        .apply_form_data(&[("facility_id".to_string(), "7".to_string())]);
    let start = dialog.begin_submit();

    let SubmitStart::Invalid(errors) = start else {
        panic!("expected the empty select to be rejected");
    };
    assert_eq!(errors.get("facility_id").unwrap().kind, ErrorKind::Required);
}

#[test]
fn rejected_submission_returns_to_open_with_values_intact() {
    let mut dialog = open_room_dialog();
    let persistence = StubPersistence::rejecting("Duplicate name");
    let mut observer = Observer::default();

    let form = dialog.form_mut().unwrap();
    form.set_input("name", "Phòng A1").unwrap();
    form.set_input("capacity", "10").unwrap();

    let outcome = dialog.submit(&persistence, &mut observer);

    let SubmitOutcome::Failed(error) = outcome else {
        panic!("expected a submit failure");
    };
    assert_eq!(error.kind, ErrorKind::SubmitFailed);
    assert_eq!(error.message, "Duplicate name");
    assert_eq!(dialog.phase(), DialogPhase::Open);
    assert_eq!(observer.failures, vec![error.clone()]);
    assert!(observer.successes.is_empty());

    let form = dialog.form().unwrap();
    assert_eq!(form.value("name"), &FieldValue::from("Phòng A1"));
    assert_eq!(form.value("capacity"), &FieldValue::Number(10.0));
    assert_eq!(dialog.view().unwrap().submit_error, Some(error));
}

#[test]
fn split_submission_ignores_close_until_resolved() {
    let mut dialog = open_room_dialog();
    let mut observer = Observer::default();
    dialog.form_mut().unwrap().set_input("name", "Phòng B").unwrap();

    let SubmitStart::Ready(request) = dialog.begin_submit() else {
        panic!("expected a ready submission");
    };
    assert!(matches!(dialog.begin_submit(), SubmitStart::Busy));
    assert!(!dialog.close(CloseTrigger::Backdrop, &mut observer));
    assert!(!dialog.view().unwrap().close_enabled);

    let outcome = dialog.finish_submit(Ok(request.payload.clone()), &mut observer);

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(observer.successes, vec![request.payload]);
    assert_eq!(observer.closes, 0);
}

#[test]
fn cancel_closes_and_notifies() {
    let mut dialog = open_room_dialog();
    let mut observer = Observer::default();

    assert!(dialog.close(CloseTrigger::Cancel, &mut observer));
    assert_eq!(observer.closes, 1);
    assert!(!dialog.is_open());
    assert!(dialog.open_create(room_fields(), room_schema()).is_ok());
}
