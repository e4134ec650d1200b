//! Validated Form WASM
//!
//! Browser host for `validated-form-core`: wraps form controls, feedback
//! nodes and `setTimeout` behind the core traits and exports a
//! `ValidatedForm` class to JavaScript.
//!
//! ```javascript
//! const form = new ValidatedForm('address', {
//!     feedback: { duration_ms: 2500 },
//!     constraints: { zip: { ch: { pattern: '^(CH-)?\\d{4}$', message: '4 digits' } } },
//!     messages: { zip: { valueMissing: 'Please enter your ZIP code' } },
//! }, 'country');
//! form.onValid(values => console.log(values));
//! form.mount();
//! ```

use serde::{Deserialize, Serialize};
use validated_form_core::{FailureKind, ValidityReport};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod form;

#[cfg(target_arch = "wasm32")]
pub use form::ValidatedForm;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// The flags of a browser `ValidityState`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidityFlags {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
}

impl ValidityFlags {
    pub fn report(&self) -> ValidityReport {
        let mut report = ValidityReport::valid();
        for (kind, failed) in [
            (FailureKind::ValueMissing, self.value_missing),
            (FailureKind::TypeMismatch, self.type_mismatch),
            (FailureKind::PatternMismatch, self.pattern_mismatch),
            (FailureKind::TooLong, self.too_long),
            (FailureKind::TooShort, self.too_short),
            (FailureKind::RangeUnderflow, self.range_underflow),
            (FailureKind::RangeOverflow, self.range_overflow),
            (FailureKind::StepMismatch, self.step_mismatch),
            (FailureKind::BadInput, self.bad_input),
            (FailureKind::CustomError, self.custom_error),
        ] {
            report.set(kind, failed);
        }
        report
    }
}

/// First failure of a validity object, by precedence
///
/// # Example (JavaScript)
/// ```javascript
/// firstFailure(input.validity); // "valueMissing"
/// ```
#[wasm_bindgen(js_name = firstFailure)]
pub fn first_failure_js(validity: JsValue) -> Result<Option<String>, JsValue> {
    let flags: ValidityFlags = serde_wasm_bindgen::from_value(validity)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse validity: {}", e)))?;
    Ok(flags.report().first_failure().map(|kind| kind.as_str().to_string()))
}
