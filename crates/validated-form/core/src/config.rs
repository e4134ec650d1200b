// File: src/config.rs
// Purpose: Form configuration parsing from validated-form.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::messages::ErrorMessageTable;
use crate::registry::ConstraintRegistry;

/// Everything the embedding application injects into a form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub form: FormSection,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// `[constraints.<field>.<locale>]` tables with `pattern` and `message`
    #[serde(default)]
    pub constraints: ConstraintRegistry,

    /// `[messages.<field>]` tables mapping failure kinds to text
    #[serde(default)]
    pub messages: ErrorMessageTable,
}

/// Form element attributes
#[derive(Debug, Clone, Deserialize)]
pub struct FormSection {
    #[serde(default = "default_form_id")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_class_name")]
    pub class_name: String,
}

/// Feedback display settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackConfig {
    /// How long an error stays visible; absent or 0 keeps it until replaced
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl FeedbackConfig {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

fn default_form_id() -> String {
    "validated-form".to_string()
}

fn default_class_name() -> String {
    "v5-validated-form".to_string()
}

impl Default for FormSection {
    fn default() -> Self {
        Self {
            id: default_form_id(),
            name: None,
            class_name: default_class_name(),
        }
    }
}

impl FormConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./validated-form.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("validated-form.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(content).context("Invalid form configuration")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid form configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;
    use crate::locale::Locale;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert_eq!(config.form.id, "validated-form");
        assert_eq!(config.form.class_name, "v5-validated-form");
        assert_eq!(config.feedback.duration(), None);
        assert!(config.constraints.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = FormConfig::from_toml_str(
            r#"
            [form]
            id = "myForm"

            [feedback]
            duration_ms = 3000

            [constraints.zip.ch]
            pattern = '^(CH-)?\d{4}$'
            message = "Switzerland ZIPs must have exactly 4 digits: e.g. CH-1950 or 1950"

            [messages.zip]
            valueMissing = "Please enter your ZIP code"

            [messages.country]
            valueMissing = "Please enter a country"
            "#,
        )
        .unwrap();

        assert_eq!(config.form.id, "myForm");
        assert_eq!(config.feedback.duration(), Some(Duration::from_millis(3000)));
        assert_eq!(
            config.constraints.pattern_for("zip", &Locale::from("ch")),
            Some(r"^(CH-)?\d{4}$")
        );
        assert!(config
            .messages
            .message_for("country", FailureKind::ValueMissing)
            .is_some());
    }

    #[test]
    fn test_zero_duration_is_persistent() {
        let config = FormConfig::from_toml_str("[feedback]\nduration_ms = 0\n").unwrap();
        assert_eq!(config.feedback.duration(), None);
    }

    #[test]
    fn test_empty_and_missing_files() {
        assert!(FormConfig::from_toml_str("   \n").unwrap().constraints.is_empty());
        let config = FormConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.form.id, "validated-form");
    }

    #[test]
    fn test_unknown_failure_kind_is_rejected() {
        let err = FormConfig::from_toml_str("[messages.zip]\nvalid = \"nope\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid form configuration"));
    }

    #[test]
    fn test_json_config() {
        let config = FormConfig::from_json_str(
            r#"{"constraints": {"zip": {"us": {"pattern": "^\\d{5}$", "message": "five"}}}}"#,
        )
        .unwrap();
        assert_eq!(config.constraints.message_for("zip", &Locale::from("us")), Some("five"));
    }

    #[test]
    fn test_sample_config_matches_presets() {
        let config = FormConfig::from_toml_str(include_str!("../../../../validated-form.toml")).unwrap();
        assert_eq!(config.constraints, crate::presets::postal_codes());
        assert_eq!(config.feedback.duration(), Some(Duration::from_millis(2500)));
        assert_eq!(config.messages.missing_kinds("zip"), vec![FailureKind::CustomError]);
    }
}
