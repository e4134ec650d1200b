// File: src/evaluator.rs
// Purpose: Submit-time sweep over all fields of a form

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::classifier::is_action_trigger;
use crate::failure::FailureKind;
use crate::feedback::{FeedbackContent, FeedbackPresenter, FeedbackSurface, Scheduler};
use crate::field::Field;
use crate::messages::{ErrorMessageTable, Message};

/// Collected values of a valid form, keyed by field identity
pub type FormValues = HashMap<String, String>;

/// The host event that triggered the submission
pub trait SubmitEvent {
    /// Stop the host's default form navigation
    fn prevent_default(&mut self);
}

/// One invalid field of a failed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    pub kind: FailureKind,
    /// `None` when the message table has no entry for this kind
    pub message: Option<String>,
}

/// Outcome of a submission pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Every field passed; values of all non-action fields
    Valid(FormValues),
    /// At least one field failed; no values are kept
    Invalid(Vec<FieldFailure>),
}

impl SubmissionResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, SubmissionResult::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Extract the values if the submission passed
    pub fn ok(self) -> Option<FormValues> {
        match self {
            SubmissionResult::Valid(values) => Some(values),
            SubmissionResult::Invalid(_) => None,
        }
    }

    /// Extract the failures if the submission failed
    pub fn err(self) -> Option<Vec<FieldFailure>> {
        match self {
            SubmissionResult::Valid(_) => None,
            SubmissionResult::Invalid(failures) => Some(failures),
        }
    }
}

pub struct SubmissionEvaluator<'a> {
    messages: &'a ErrorMessageTable,
    duration: Option<Duration>,
}

impl<'a> SubmissionEvaluator<'a> {
    pub fn new(messages: &'a ErrorMessageTable) -> Self {
        Self {
            messages,
            duration: None,
        }
    }

    /// How long feedback stays up; `None` keeps it until replaced
    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    /// Evaluate every field in document order.
    ///
    /// Default navigation is always prevented first. Each invalid field gets
    /// feedback for its first failing kind; when that kind has no message, or
    /// it resolves to an empty string, the field shows no node at all. Valid
    /// fields have residual custom validity and feedback cleared. Field values
    /// are never modified.
    pub fn evaluate<F, S>(
        &self,
        event: &mut dyn SubmitEvent,
        fields: &mut [F],
        presenter: &mut FeedbackPresenter<S>,
        scheduler: &dyn Scheduler,
    ) -> SubmissionResult
    where
        F: Field,
        S: FeedbackSurface,
    {
        event.prevent_default();

        let mut values = FormValues::new();
        let mut failures = Vec::new();

        for (index, field) in fields.iter_mut().enumerate() {
            if is_action_trigger(field.descriptor()) {
                continue;
            }

            let identity = field.descriptor().identity(index);

            match field.validity().first_failure() {
                Some(kind) => {
                    let message = self
                        .messages
                        .message_for(&identity, kind)
                        .map(Message::resolve)
                        .filter(|text| !text.is_empty());

                    match &message {
                        Some(text) => {
                            presenter.show_error(
                                field,
                                &identity,
                                FeedbackContent::Message(Message::Static(text.clone())),
                                self.duration,
                                scheduler,
                            );
                        }
                        None => {
                            tracing::warn!(
                                field = %identity,
                                kind = %kind,
                                "no error message configured for failure"
                            );
                            presenter.dismiss(&identity);
                            field.set_error_state(true);
                        }
                    }

                    failures.push(FieldFailure {
                        field: identity,
                        kind,
                        message,
                    });
                }
                None => {
                    field.set_custom_validity("");
                    presenter.clear(field, &identity);
                    values.insert(identity, field.value());
                }
            }
        }

        if failures.is_empty() {
            SubmissionResult::Valid(values)
        } else {
            tracing::debug!(failed = failures.len(), "submission rejected");
            SubmissionResult::Invalid(failures)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ManualScheduler, MemoryField, MemorySubmitEvent, MemorySurface};
    use pretty_assertions::assert_eq;

    fn messages() -> ErrorMessageTable {
        ErrorMessageTable::new()
            .with_message("zip", FailureKind::ValueMissing, "Please enter your ZIP code")
            .with_message("zip", FailureKind::PatternMismatch, "Wrong format")
            .with_message("country", FailureKind::ValueMissing, "Please enter a country")
    }

    #[test]
    fn test_valid_form_collects_values() {
        let messages = messages();
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip", "country"]));
        let scheduler = ManualScheduler::new();
        let mut event = MemorySubmitEvent::default();
        let mut fields = vec![
            MemoryField::input("zip").required().with_value("8000"),
            MemoryField::input("country").with_value("ch"),
            MemoryField::button("submit"),
        ];

        let result = evaluator.evaluate(&mut event, &mut fields, &mut presenter, &scheduler);

        assert!(event.default_prevented);
        let values = result.ok().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["zip"], "8000");
        assert_eq!(values["country"], "ch");
        assert_eq!(presenter.surface().feedback_count(), 0);
    }

    #[test]
    fn test_first_failure_wins() {
        let messages = messages();
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip"]));
        let scheduler = ManualScheduler::new();
        let mut event = MemorySubmitEvent::default();
        let mut fields = vec![MemoryField::input("zip").required().with_pattern(r"\d{4}")];
        fields[0].set_custom_validity("custom");

        let failures = evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .err()
            .unwrap();

        assert_eq!(
            failures,
            vec![FieldFailure {
                field: "zip".to_string(),
                kind: FailureKind::ValueMissing,
                message: Some("Please enter your ZIP code".to_string()),
            }]
        );
        let nodes = presenter.surface().feedback_for("zip");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "Please enter your ZIP code");
    }

    #[test]
    fn test_missing_message_renders_nothing() {
        let messages = messages();
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip"]));
        let scheduler = ManualScheduler::new();
        let mut event = MemorySubmitEvent::default();
        let mut fields = vec![MemoryField::input("zip").with_value("abcd").with_length(None, Some(2))];

        let failures = evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .err()
            .unwrap();

        assert_eq!(failures[0].kind, FailureKind::TooLong);
        assert_eq!(failures[0].message, None);
        assert_eq!(presenter.surface().feedback_count(), 0);
        assert!(fields[0].is_errored());
    }

    #[test]
    fn test_unnamed_fields_use_position() {
        let messages = ErrorMessageTable::new();
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::default());
        let scheduler = ManualScheduler::new();
        let mut event = MemorySubmitEvent::default();
        let mut fields = vec![
            MemoryField::button("reset"),
            MemoryField::new(Default::default()).with_value("anonymous"),
        ];

        let values = evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .ok()
            .unwrap();
        assert_eq!(values.get("1").map(String::as_str), Some("anonymous"));
    }

    #[test]
    fn test_valid_field_loses_stale_state() {
        let messages = messages();
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip"]));
        let scheduler = ManualScheduler::new();
        let mut fields = vec![MemoryField::input("zip").required()];

        let mut event = MemorySubmitEvent::default();
        assert!(evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .is_invalid());
        assert!(fields[0].is_errored());

        fields[0].set_value("8000");
        let mut event = MemorySubmitEvent::default();
        assert!(evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .is_valid());
        assert!(!fields[0].is_errored());
        assert_eq!(presenter.surface().feedback_count(), 0);
        assert_eq!(fields[0].value(), "8000");
    }

    #[test]
    fn test_unmessaged_failure_removes_earlier_feedback() {
        let messages =
            ErrorMessageTable::new().with_message("code", FailureKind::ValueMissing, "Please enter a code");
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["code"]));
        let scheduler = ManualScheduler::new();
        let mut fields = vec![MemoryField::input("code").required().with_length(None, Some(2))];

        let mut event = MemorySubmitEvent::default();
        evaluator.evaluate(&mut event, &mut fields, &mut presenter, &scheduler);
        assert_eq!(presenter.surface().feedback_for("code").len(), 1);

        fields[0].set_value("abcd");
        let mut event = MemorySubmitEvent::default();
        let failures = evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .err()
            .unwrap();

        assert_eq!(failures[0].kind, FailureKind::TooLong);
        assert_eq!(failures[0].message, None);
        assert!(presenter.surface().feedback_for("code").is_empty());
        assert_eq!(presenter.live_node("code"), None);
        assert!(fields[0].is_errored());
    }

    #[test]
    fn test_empty_resolved_message_counts_as_missing() {
        let messages = ErrorMessageTable::new()
            .with_message("zip", FailureKind::ValueMissing, "Please enter your ZIP code")
            .with_message("zip", FailureKind::CustomError, Message::deferred(String::new));
        let evaluator = SubmissionEvaluator::new(&messages);
        let mut presenter = FeedbackPresenter::new(MemorySurface::with_fields(["zip"]));
        let scheduler = ManualScheduler::new();
        let mut fields = vec![MemoryField::input("zip").required()];

        let mut event = MemorySubmitEvent::default();
        evaluator.evaluate(&mut event, &mut fields, &mut presenter, &scheduler);
        assert_eq!(presenter.surface().feedback_count(), 1);

        fields[0].set_value("CH-195");
        fields[0].set_custom_validity("no longer applies");
        let mut event = MemorySubmitEvent::default();
        let failures = evaluator
            .evaluate(&mut event, &mut fields, &mut presenter, &scheduler)
            .err()
            .unwrap();

        assert_eq!(failures[0].kind, FailureKind::CustomError);
        assert_eq!(failures[0].message, None);
        assert_eq!(presenter.surface().feedback_count(), 0);
        assert!(fields[0].is_errored());
    }
}
