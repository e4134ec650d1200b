// File: src/field.rs
// Purpose: Field descriptors and the host capability every form control exposes

use serde::{Deserialize, Serialize};

use crate::failure::ValidityReport;

/// Declarative description of one child control of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    /// Element tag: `input`, `select`, `textarea`, `button`
    #[serde(default = "default_tag")]
    pub tag: String,

    /// The `type` attribute, when the element has one
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,

    #[serde(default)]
    pub required: bool,
}

fn default_tag() -> String {
    "input".to_string()
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self {
            name: None,
            id: None,
            tag: default_tag(),
            input_type: None,
            required: false,
        }
    }
}

impl FieldDescriptor {
    /// A text input with the given name
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            input_type: Some("text".to_string()),
            ..Self::default()
        }
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            tag: "select".to_string(),
            ..Self::default()
        }
    }

    /// A `<button type="...">`
    pub fn button(kind: impl Into<String>) -> Self {
        Self {
            tag: "button".to_string(),
            input_type: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Key used for constraint and message lookups: `name`, else `id`
    pub fn key(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.id.as_deref()))
    }

    /// Identity within a form: `name`, else `id`, else the positional index
    pub fn identity(&self, index: usize) -> String {
        self.key()
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Where a field sits, so feedback can line up with it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldGeometry {
    /// Inline CSS width of the field, copied verbatim
    pub width: Option<String>,
    /// Horizontal offset from the offset parent, in pixels
    pub offset_left: f64,
}

/// A live form control as seen by the validation engine.
///
/// Hosts implement this over their own element types.
pub trait Field {
    fn descriptor(&self) -> &FieldDescriptor;

    fn value(&self) -> String;

    /// Current native validity, including `customError`
    fn validity(&self) -> ValidityReport;

    /// Set the custom validity message; an empty message clears it
    fn set_custom_validity(&mut self, message: &str);

    /// Toggle the errored state (the `error` class in a browser)
    fn set_error_state(&mut self, errored: bool);

    fn geometry(&self) -> FieldGeometry {
        FieldGeometry::default()
    }
}

impl<T: Field + ?Sized> Field for Box<T> {
    fn descriptor(&self) -> &FieldDescriptor {
        (**self).descriptor()
    }

    fn value(&self) -> String {
        (**self).value()
    }

    fn validity(&self) -> ValidityReport {
        (**self).validity()
    }

    fn set_custom_validity(&mut self, message: &str) {
        (**self).set_custom_validity(message)
    }

    fn set_error_state(&mut self, errored: bool) {
        (**self).set_error_state(errored)
    }

    fn geometry(&self) -> FieldGeometry {
        (**self).geometry()
    }
}
