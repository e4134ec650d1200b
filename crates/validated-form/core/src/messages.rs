//! Error message table: field -> failure kind -> message

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::failure::FailureKind;
use crate::locale::LocaleSource;
use crate::registry::ConstraintRegistry;

/// Text shown for a failure, either fixed or produced when displayed
#[derive(Clone)]
pub enum Message {
    Static(String),
    Deferred(Rc<dyn Fn() -> String>),
}

impl Message {
    pub fn deferred(produce: impl Fn() -> String + 'static) -> Self {
        Message::Deferred(Rc::new(produce))
    }

    /// Produce the text; deferred messages are evaluated on every call
    pub fn resolve(&self) -> String {
        match self {
            Message::Static(text) => text.clone(),
            Message::Deferred(produce) => produce(),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Message::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Static(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Static(text)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Message::Static)
    }
}

/// Messages keyed by field identity and failure kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ErrorMessageTable {
    messages: HashMap<String, HashMap<FailureKind, Message>>,
}

impl ErrorMessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(
        mut self,
        field: impl Into<String>,
        kind: FailureKind,
        message: impl Into<Message>,
    ) -> Self {
        self.insert(field, kind, message);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, kind: FailureKind, message: impl Into<Message>) {
        self.messages
            .entry(field.into())
            .or_default()
            .insert(kind, message.into());
    }

    pub fn message_for(&self, field: &str, kind: FailureKind) -> Option<&Message> {
        self.messages.get(field).and_then(|by_kind| by_kind.get(&kind))
    }

    /// Give each constrained field a `customError` message unless one is set.
    ///
    /// The text is looked up in `registry` when displayed, for the locale
    /// `locale` reports at that moment.
    pub fn derive_custom_errors(
        &mut self,
        registry: &Rc<ConstraintRegistry>,
        locale: &Rc<dyn LocaleSource>,
    ) {
        for field in registry.fields() {
            if self.message_for(field, FailureKind::CustomError).is_some() {
                continue;
            }
            let registry = Rc::clone(registry);
            let locale = Rc::clone(locale);
            let name = field.to_string();
            self.insert(
                field,
                FailureKind::CustomError,
                Message::deferred(move || {
                    let current = locale.current_locale();
                    registry
                        .message_for(&name, &current)
                        .unwrap_or_default()
                        .to_string()
                }),
            );
        }
    }

    /// Failure kinds with no message for `field`, in precedence order
    pub fn missing_kinds(&self, field: &str) -> Vec<FailureKind> {
        FailureKind::PRECEDENCE
            .into_iter()
            .filter(|kind| self.message_for(field, *kind).is_none())
            .collect()
    }
}
