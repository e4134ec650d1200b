//! Misconfiguration is reported through tracing, never through panics

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use validated_form_core::memory::{ManualScheduler, MemoryField, MemorySubmitEvent, MemorySurface};
use validated_form_core::{
    build_live_validator, ConstraintRegistry, ConstraintRule, ErrorMessageTable, FailureKind,
    FeedbackPresenter, FormController, LiveOutcome, Locale, LocaleSource,
};

/// Collects `[LEVEL] message` lines of every event
struct LogCapture {
    logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        struct MessageVisitor {
            message: String,
        }

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{:?}", value);
                }
            }
        }

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        self.logs
            .lock()
            .unwrap()
            .push(format!("[{}] {}", event.metadata().level(), visitor.message));
    }
}

fn capture() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
    let logs = Arc::new(Mutex::new(Vec::new()));
    let guard = tracing_subscriber::registry()
        .with(LogCapture { logs: logs.clone() })
        .set_default();
    (logs, guard)
}

fn warned(logs: &Mutex<Vec<String>>, text: &str) -> bool {
    logs.lock()
        .unwrap()
        .iter()
        .any(|line| line.starts_with("[WARN]") && line.contains(text))
}

#[test]
fn test_malformed_pattern_fails_closed_with_warning() {
    let (logs, _guard) = capture();

    let registry = Rc::new(
        ConstraintRegistry::new().with_rule("zip", "ch", ConstraintRule::new("(\\d{4}", "broken")),
    );
    let locale: Rc<dyn LocaleSource> = Rc::new(Locale::from("ch"));
    let validator = build_live_validator("zip", &registry, &locale).unwrap();

    let mut field = MemoryField::input("zip").with_value("1950");
    assert_eq!(validator.on_input(&mut field), LiveOutcome::FailedClosed);
    assert_eq!(field.custom_validity(), "broken");
    assert!(
        warned(&logs, "failed to compile"),
        "expected a warning, got {:?}",
        logs.lock().unwrap()
    );
}

#[test]
fn test_missing_message_is_logged() {
    let (logs, _guard) = capture();

    let mut controller = FormController::new(
        Rc::new(ConstraintRegistry::new()),
        Rc::new(ErrorMessageTable::new()),
        Rc::new(Locale::from("en")),
    );
    let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["email"]));
    let mut fields = vec![MemoryField::input("email").with_type("email").with_value("nope")];

    let failures = controller
        .submit(
            &mut MemorySubmitEvent::default(),
            &mut fields,
            &mut presenter,
            &ManualScheduler::new(),
        )
        .err()
        .unwrap();

    assert_eq!(failures[0].kind, FailureKind::TypeMismatch);
    assert!(fields[0].is_errored());
    assert!(warned(&logs, "no error message configured"));
}

#[test]
fn test_valid_submission_is_logged_at_info() {
    let (logs, _guard) = capture();

    let mut controller = FormController::new(
        Rc::new(ConstraintRegistry::new()),
        Rc::new(ErrorMessageTable::new()),
        Rc::new(Locale::from("en")),
    );
    let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["city"]));
    let mut fields = vec![MemoryField::input("city").with_value("Bern")];

    assert!(controller
        .submit(
            &mut MemorySubmitEvent::default(),
            &mut fields,
            &mut presenter,
            &ManualScheduler::new(),
        )
        .is_valid());
    assert!(logs
        .lock()
        .unwrap()
        .iter()
        .any(|line| line == "[INFO] form is valid"));
}

#[test]
fn test_empty_message_is_logged_as_missing() {
    let (logs, _guard) = capture();

    let messages = ErrorMessageTable::new().with_message("zip", FailureKind::ValueMissing, "");
    let mut controller = FormController::new(
        Rc::new(ConstraintRegistry::new()),
        Rc::new(messages),
        Rc::new(Locale::from("en")),
    );
    let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip"]));
    let mut fields = vec![MemoryField::input("zip").required()];

    let failures = controller
        .submit(
            &mut MemorySubmitEvent::default(),
            &mut fields,
            &mut presenter,
            &ManualScheduler::new(),
        )
        .err()
        .unwrap();

    assert_eq!(failures[0].message, None);
    assert_eq!(presenter.surface().feedback_count(), 0);
    assert!(warned(&logs, "no error message configured"));
}
