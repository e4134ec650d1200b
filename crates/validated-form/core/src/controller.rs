//! Form controller: wires live validators and the submit sweep to a form's fields

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::classifier::is_action_trigger;
use crate::config::FormConfig;
use crate::evaluator::{FormValues, SubmissionEvaluator, SubmissionResult, SubmitEvent};
use crate::feedback::{FeedbackPresenter, FeedbackSurface, Scheduler};
use crate::field::{Field, FieldDescriptor};
use crate::live::{build_live_validator, LiveValidator};
use crate::locale::LocaleSource;
use crate::messages::ErrorMessageTable;
use crate::registry::ConstraintRegistry;

/// Handler a host must attach to one field
#[derive(Debug, Clone)]
pub enum Binding {
    /// Run on every input/change event of the field
    Input(LiveValidator),
    /// Run [`FormController::submit`] on activation
    Submit,
}

type ValidCallback = Box<dyn FnMut(&FormValues)>;

pub struct FormController {
    registry: Rc<ConstraintRegistry>,
    messages: Rc<ErrorMessageTable>,
    locale: Rc<dyn LocaleSource>,
    duration: Option<Duration>,
    on_valid: Option<ValidCallback>,
}

impl FormController {
    pub fn new(
        registry: Rc<ConstraintRegistry>,
        messages: Rc<ErrorMessageTable>,
        locale: Rc<dyn LocaleSource>,
    ) -> Self {
        Self {
            registry,
            messages,
            locale,
            duration: None,
            on_valid: None,
        }
    }

    /// Build a controller from loaded configuration.
    ///
    /// Constrained fields without a configured `customError` message get one
    /// derived from the registry.
    pub fn from_config(config: FormConfig, locale: Rc<dyn LocaleSource>) -> Self {
        let duration = config.feedback.duration();
        let registry = Rc::new(config.constraints);
        let mut messages = config.messages;
        messages.derive_custom_errors(&registry, &locale);
        Self::new(registry, Rc::new(messages), locale).with_duration(duration)
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    /// Receive the collected values after each fully valid submission
    pub fn on_valid(mut self, callback: impl FnMut(&FormValues) + 'static) -> Self {
        self.on_valid = Some(Box::new(callback));
        self
    }

    pub fn registry(&self) -> &Rc<ConstraintRegistry> {
        &self.registry
    }

    pub fn messages(&self) -> &Rc<ErrorMessageTable> {
        &self.messages
    }

    pub fn locale(&self) -> &Rc<dyn LocaleSource> {
        &self.locale
    }

    /// Hand each descriptor its binding through `attach`.
    ///
    /// Action triggers get [`Binding::Submit`]; fields with a custom
    /// constraint at the current locale get [`Binding::Input`]; all others
    /// get nothing. Call again whenever the set of children changes.
    /// Returns the number of bindings attached.
    pub fn mount<A>(&self, descriptors: &[FieldDescriptor], mut attach: A) -> usize
    where
        A: FnMut(usize, &FieldDescriptor, Binding),
    {
        let mut attached = 0;

        for (index, descriptor) in descriptors.iter().enumerate() {
            if is_action_trigger(descriptor) {
                attach(index, descriptor, Binding::Submit);
                attached += 1;
                continue;
            }

            let Some(key) = descriptor.key() else {
                continue;
            };

            let missing = self.messages.missing_kinds(key);
            if !missing.is_empty() {
                tracing::debug!(field = key, ?missing, "failure kinds without a message");
            }

            if let Some(validator) = build_live_validator(key, &self.registry, &self.locale) {
                attach(index, descriptor, Binding::Input(validator));
                attached += 1;
            }
        }

        tracing::debug!(fields = descriptors.len(), attached, "form mounted");
        attached
    }

    /// Run a submission pass; emits the values once if every field is valid
    pub fn submit<F, S>(
        &mut self,
        event: &mut dyn SubmitEvent,
        fields: &mut [F],
        presenter: &mut FeedbackPresenter<S>,
        scheduler: &dyn Scheduler,
    ) -> SubmissionResult
    where
        F: Field,
        S: FeedbackSurface,
    {
        let result = SubmissionEvaluator::new(&self.messages)
            .with_duration(self.duration)
            .evaluate(event, fields, presenter, scheduler);

        if let SubmissionResult::Valid(values) = &result {
            tracing::info!(?values, "form is valid");
            if let Some(callback) = self.on_valid.as_mut() {
                callback(values);
            }
        }

        result
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("registry", &self.registry)
            .field("messages", &self.messages)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::registry::ConstraintRule;

    fn controller(locale: &str) -> FormController {
        let registry = ConstraintRegistry::new()
            .with_rule("zip", "ch", ConstraintRule::new(r"^(CH-)?\d{4}$", "four digits"));
        FormController::new(
            Rc::new(registry),
            Rc::new(ErrorMessageTable::new()),
            Rc::new(Locale::from(locale)),
        )
    }

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::input("zip"),
            FieldDescriptor::select("country"),
            FieldDescriptor::button("submit"),
        ]
    }

    #[test]
    fn test_mount_binds_constrained_fields_and_triggers() {
        let mut bound = Vec::new();
        let attached = controller("ch").mount(&descriptors(), |index, _, binding| {
            bound.push((index, matches!(binding, Binding::Submit)));
        });

        assert_eq!(attached, 2);
        assert_eq!(bound, vec![(0, false), (2, true)]);
    }

    #[test]
    fn test_mount_without_rule_for_locale() {
        let mut bound = Vec::new();
        controller("it").mount(&descriptors(), |index, _, _| bound.push(index));
        assert_eq!(bound, vec![2]);
    }

    #[test]
    fn test_remount_rewires_new_children() {
        let controller = controller("ch");
        assert_eq!(controller.mount(&descriptors(), |_, _, _| {}), 2);

        let mut children = descriptors();
        children.push(FieldDescriptor::button("reset"));
        assert_eq!(controller.mount(&children, |_, _, _| {}), 3);
    }
}
