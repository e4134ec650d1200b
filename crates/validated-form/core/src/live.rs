//! Live validation: per-field input handlers driven by the constraint registry

use std::fmt;
use std::rc::Rc;

use crate::field::Field;
use crate::locale::LocaleSource;
use crate::registry::ConstraintRegistry;

/// What a live validator did with the current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveOutcome {
    /// Value matched; custom validity cleared
    Satisfied,
    /// Value did not match; custom validity set to the rule's message
    Violated,
    /// No rule at the current locale; custom validity cleared
    NoConstraint,
    /// The pattern does not compile; the field stays invalid
    FailedClosed,
}

/// Input handler for one field with a custom constraint
#[derive(Clone)]
pub struct LiveValidator {
    field: String,
    registry: Rc<ConstraintRegistry>,
    locale: Rc<dyn LocaleSource>,
}

/// Build the live validator for `field_name`.
///
/// Returns `None` when the registry has no pattern for the field at the
/// current locale; such fields are governed by native constraints only.
pub fn build_live_validator(
    field_name: &str,
    registry: &Rc<ConstraintRegistry>,
    locale: &Rc<dyn LocaleSource>,
) -> Option<LiveValidator> {
    let current = locale.current_locale();
    registry.pattern_for(field_name, &current)?;

    Some(LiveValidator {
        field: field_name.to_string(),
        registry: Rc::clone(registry),
        locale: Rc::clone(locale),
    })
}

impl LiveValidator {
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Re-check `field` against the rule for the locale active right now
    pub fn on_input(&self, field: &mut dyn Field) -> LiveOutcome {
        let locale = self.locale.current_locale();

        let Some(rule) = self
            .registry
            .rule_for(&self.field, &locale)
            .filter(|rule| !rule.pattern.is_empty())
        else {
            field.set_custom_validity("");
            return LiveOutcome::NoConstraint;
        };

        match rule.compile(&self.field, &locale) {
            Ok(pattern) => {
                if pattern.is_match(&field.value()) {
                    field.set_custom_validity("");
                    LiveOutcome::Satisfied
                } else {
                    field.set_custom_validity(rule.message_or_fallback());
                    LiveOutcome::Violated
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "custom constraint failed to compile");
                field.set_custom_validity(rule.message_or_fallback());
                LiveOutcome::FailedClosed
            }
        }
    }
}

impl fmt::Debug for LiveValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveValidator")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;
    use crate::locale::{Locale, LocaleSelector};
    use crate::memory::MemoryField;
    use crate::registry::ConstraintRule;
    use pretty_assertions::assert_eq;

    fn setup(initial: &str) -> (Rc<ConstraintRegistry>, LocaleSelector, Rc<dyn LocaleSource>) {
        let registry = Rc::new(
            ConstraintRegistry::new()
                .with_rule("zip", "ch", ConstraintRule::new(r"^(CH-)?\d{4}$", "four digits"))
                .with_rule("zip", "de", ConstraintRule::new(r"^(D-)?\d{5}$", "five digits"))
                .with_rule("broken", "ch", ConstraintRule::new("([0-9]", "broken rule")),
        );
        let selector = LocaleSelector::new(initial);
        let source: Rc<dyn LocaleSource> = Rc::new(selector.clone());
        (registry, selector, source)
    }

    #[test]
    fn test_no_validator_without_pattern() {
        let (registry, _, source) = setup("ch");
        assert!(build_live_validator("country", &registry, &source).is_none());

        let (registry, _, source) = setup("fr");
        assert!(build_live_validator("zip", &registry, &source).is_none());
    }

    #[test]
    fn test_match_clears_and_mismatch_sets_message() {
        let (registry, _, source) = setup("ch");
        let validator = build_live_validator("zip", &registry, &source).unwrap();
        let mut field = MemoryField::input("zip").with_value("CH-195");

        assert_eq!(validator.on_input(&mut field), LiveOutcome::Violated);
        assert_eq!(field.custom_validity(), "four digits");
        assert_eq!(field.validity().first_failure(), Some(FailureKind::CustomError));

        field.set_value("1950");
        assert_eq!(validator.on_input(&mut field), LiveOutcome::Satisfied);
        assert_eq!(field.custom_validity(), "");
        assert!(field.validity().is_valid());
    }

    #[test]
    fn test_locale_is_read_at_event_time() {
        let (registry, selector, source) = setup("ch");
        let validator = build_live_validator("zip", &registry, &source).unwrap();
        let mut field = MemoryField::input("zip").with_value("12345");

        assert_eq!(validator.on_input(&mut field), LiveOutcome::Violated);

        selector.select("de");
        assert_eq!(validator.on_input(&mut field), LiveOutcome::Satisfied);
        assert!(field.validity().is_valid());

        selector.select(Locale::from("fr"));
        field.set_custom_validity("stale");
        assert_eq!(validator.on_input(&mut field), LiveOutcome::NoConstraint);
        assert_eq!(field.custom_validity(), "");
    }

    #[test]
    fn test_malformed_pattern_fails_closed() {
        let (registry, _, source) = setup("ch");
        let validator = build_live_validator("broken", &registry, &source).unwrap();
        let mut field = MemoryField::input("broken").with_value("anything");

        assert_eq!(validator.on_input(&mut field), LiveOutcome::FailedClosed);
        assert_eq!(field.custom_validity(), "broken rule");
        assert!(!field.validity().is_valid());
    }
}
