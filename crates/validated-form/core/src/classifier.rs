//! Separates value-bearing fields from action triggers

use crate::field::FieldDescriptor;

const TRIGGER_TYPES: &[&str] = &["submit", "reset", "button"];

/// True for submit/reset/generic buttons, which are never validated or collected
pub fn is_action_trigger(field: &FieldDescriptor) -> bool {
    field.tag.eq_ignore_ascii_case("button")
        || field
            .input_type
            .as_deref()
            .is_some_and(|kind| TRIGGER_TYPES.iter().any(|t| t.eq_ignore_ascii_case(kind)))
}
