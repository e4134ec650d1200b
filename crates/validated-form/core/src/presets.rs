//! Ready-made postal-code constraints and messages
//!
//! Field `zip` carries one rule per country locale; the `customError`
//! message reads the registry when shown, so it always matches the
//! locale that produced the error.

use std::rc::Rc;

use crate::failure::FailureKind;
use crate::locale::LocaleSource;
use crate::messages::ErrorMessageTable;
use crate::registry::{ConstraintRegistry, ConstraintRule};

pub const ZIP_FIELD: &str = "zip";
pub const COUNTRY_FIELD: &str = "country";

/// UK postcode, including the `GIR 0AA` special case
const ENGLAND_ZIP: &str = r"^(GIR 0AA|([A-Z--[QVX]][0-9][0-9]?|[A-Z--[QVX]][A-Z--[IJZ]][0-9][0-9]?|[A-Z--[QVX]][0-9][A-HJKSTUW]|[A-Z--[QVX]][A-Z--[IJZ]][0-9][ABEHMNPRVWXY])\s?[0-9][A-Z--[CIKMOV]]{2})$";

/// ZIP constraints for `ch`, `en`, `fr`, `de`, `nl` and `us`
pub fn postal_codes() -> ConstraintRegistry {
    ConstraintRegistry::new()
        .with_rule(
            ZIP_FIELD,
            "ch",
            ConstraintRule::new(
                r"^(CH-)?\d{4}$",
                "Switzerland ZIPs must have exactly 4 digits: e.g. CH-1950 or 1950",
            ),
        )
        .with_rule(
            ZIP_FIELD,
            "en",
            ConstraintRule::new(
                ENGLAND_ZIP,
                "England ZIPs must be a combination of letters and digits: e.g. E1, SW1, N19, DA17",
            ),
        )
        .with_rule(
            ZIP_FIELD,
            "fr",
            ConstraintRule::new(
                r"^(F-)?\d{5}$",
                "France ZIPs must have exactly 5 digits: e.g. F-75012 or 75012",
            ),
        )
        .with_rule(
            ZIP_FIELD,
            "de",
            ConstraintRule::new(
                r"^(D-)?\d{5}$",
                "Germany ZIPs must have exactly 5 digits: e.g. D-12345 or 12345",
            ),
        )
        .with_rule(
            ZIP_FIELD,
            "nl",
            ConstraintRule::new(
                r"^(NL-)?\d{4}\s*([A-RT-Z][A-Z]|S[BCE-RT-Z])$",
                "Nederland ZIPs must have exactly 4 digits, followed by 2 letters except SA, SD and SS",
            ),
        )
        .with_rule(
            ZIP_FIELD,
            "us",
            ConstraintRule::new(
                r"^\d{5}(-\d{4})?$",
                "American ZIPs must have exactly 5 digits: e.g. 02138 or 45289-1234",
            ),
        )
}

/// Messages for the `zip` and `country` fields.
///
/// `customError` on `zip` is produced at display time from `registry` for the
/// locale reported by `locale` at that moment.
pub fn postal_code_messages(
    registry: Rc<ConstraintRegistry>,
    locale: Rc<dyn LocaleSource>,
) -> ErrorMessageTable {
    let mut table = ErrorMessageTable::new();

    for kind in FailureKind::PRECEDENCE {
        if kind != FailureKind::CustomError {
            table.insert(ZIP_FIELD, kind, format!("{} constraint validation failed", kind));
        }
    }
    table.insert(ZIP_FIELD, FailureKind::ValueMissing, "Please enter your ZIP code");
    table.derive_custom_errors(&registry, &locale);

    table.insert(COUNTRY_FIELD, FailureKind::ValueMissing, "Please enter a country");
    table
}
