//! Locale keys and the capability that reports the active one

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque key selecting a regional constraint variant (`"en"`, `"ch"`, ...).
///
/// Matching is exact: `"en-GB"` and `"en"` are unrelated keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Locale {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Locale {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reports the locale in effect at the moment of the call.
///
/// Validation reads this at event time, never at attach time.
pub trait LocaleSource {
    fn current_locale(&self) -> Locale;
}

impl<F> LocaleSource for F
where
    F: Fn() -> Locale,
{
    fn current_locale(&self) -> Locale {
        self()
    }
}

impl LocaleSource for Locale {
    fn current_locale(&self) -> Locale {
        self.clone()
    }
}

/// Shared, externally driven locale choice (the model of a locale `<select>`).
///
/// Clones observe the same selection.
#[derive(Debug, Clone)]
pub struct LocaleSelector {
    current: Rc<RefCell<Locale>>,
}

impl LocaleSelector {
    pub fn new(initial: impl Into<Locale>) -> Self {
        Self {
            current: Rc::new(RefCell::new(initial.into())),
        }
    }

    pub fn select(&self, locale: impl Into<Locale>) {
        let locale = locale.into();
        tracing::debug!(%locale, "locale selected");
        *self.current.borrow_mut() = locale;
    }
}

impl LocaleSource for LocaleSelector {
    fn current_locale(&self) -> Locale {
        self.current.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_clones_share_state() {
        let selector = LocaleSelector::new("en");
        let observer = selector.clone();
        selector.select("ch");
        assert_eq!(observer.current_locale(), Locale::from("ch"));
    }

    #[test]
    fn test_closure_source_is_read_per_call() {
        let selector = LocaleSelector::new("fr");
        let handle = selector.clone();
        let source = move || handle.current_locale();
        assert_eq!(source.current_locale().as_str(), "fr");
        selector.select("de");
        assert_eq!(source.current_locale().as_str(), "de");
    }

    #[test]
    fn test_locale_keys_are_exact() {
        assert_ne!(Locale::from("en-GB"), Locale::from("en"));
    }
}
