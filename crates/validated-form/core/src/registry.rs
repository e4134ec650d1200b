//! Constraint registry: field name -> locale -> (pattern, message)

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ConstraintError;
use crate::locale::Locale;

/// Message used when a rule is configured without one
pub const FALLBACK_MESSAGE: &str = "Please match the requested format.";

/// A locale-specific custom constraint for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRule {
    pub pattern: String,
    #[serde(default)]
    pub message: String,
}

impl ConstraintRule {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Compile the pattern with case-sensitive matching
    pub fn compile(&self, field: &str, locale: &Locale) -> Result<Regex, ConstraintError> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(false)
            .build()
            .map_err(|source| ConstraintError::InvalidPattern {
                field: field.to_string(),
                locale: locale.to_string(),
                source,
            })
    }

    /// The configured message, or [`FALLBACK_MESSAGE`] when it is blank
    pub fn message_or_fallback(&self) -> &str {
        if self.message.is_empty() {
            FALLBACK_MESSAGE
        } else {
            &self.message
        }
    }
}

/// Immutable lookup table of custom constraints.
///
/// Lookups are exact on both the field name and the locale key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintRegistry {
    rules: HashMap<String, HashMap<Locale, ConstraintRule>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any previous rule for the same field and locale
    pub fn with_rule(
        mut self,
        field: impl Into<String>,
        locale: impl Into<Locale>,
        rule: ConstraintRule,
    ) -> Self {
        self.insert(field, locale, rule);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, locale: impl Into<Locale>, rule: ConstraintRule) {
        self.rules
            .entry(field.into())
            .or_default()
            .insert(locale.into(), rule);
    }

    pub fn rule_for(&self, field: &str, locale: &Locale) -> Option<&ConstraintRule> {
        self.rules.get(field).and_then(|by_locale| by_locale.get(locale))
    }

    /// Pattern for `field` at `locale`; `None` when no usable pattern exists
    pub fn pattern_for(&self, field: &str, locale: &Locale) -> Option<&str> {
        self.rule_for(field, locale)
            .map(|rule| rule.pattern.as_str())
            .filter(|pattern| !pattern.is_empty())
    }

    pub fn message_for(&self, field: &str, locale: &Locale) -> Option<&str> {
        self.rule_for(field, locale).map(|rule| rule.message.as_str())
    }

    /// Names of all fields with at least one rule entry
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(String::as_str)
    }

    /// Locales configured for a field, sorted
    pub fn locales_for(&self, field: &str) -> Vec<&Locale> {
        let mut locales: Vec<_> = self
            .rules
            .get(field)
            .map(|by_locale| by_locale.keys().collect())
            .unwrap_or_default();
        locales.sort();
        locales
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(HashMap::is_empty)
    }
}
