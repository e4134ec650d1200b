//! Native constraint failure kinds and the validity snapshot built from them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownFailureKind;

/// A named category of constraint violation.
///
/// Variants are declared in precedence order; see [`FailureKind::PRECEDENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    ValueMissing,
    TypeMismatch,
    PatternMismatch,
    TooLong,
    TooShort,
    RangeUnderflow,
    RangeOverflow,
    StepMismatch,
    BadInput,
    CustomError,
}

impl FailureKind {
    /// Fixed ranking used when several constraints fail at once.
    ///
    /// Follows the attribute order of the DOM `ValidityState` interface, so a
    /// required field that is empty reports `valueMissing` before anything
    /// pattern related, and a custom validity message is reported only when no
    /// native constraint fails.
    pub const PRECEDENCE: [FailureKind; 10] = [
        FailureKind::ValueMissing,
        FailureKind::TypeMismatch,
        FailureKind::PatternMismatch,
        FailureKind::TooLong,
        FailureKind::TooShort,
        FailureKind::RangeUnderflow,
        FailureKind::RangeOverflow,
        FailureKind::StepMismatch,
        FailureKind::BadInput,
        FailureKind::CustomError,
    ];

    /// The DOM property name of this failure kind
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ValueMissing => "valueMissing",
            FailureKind::TypeMismatch => "typeMismatch",
            FailureKind::PatternMismatch => "patternMismatch",
            FailureKind::TooLong => "tooLong",
            FailureKind::TooShort => "tooShort",
            FailureKind::RangeUnderflow => "rangeUnderflow",
            FailureKind::RangeOverflow => "rangeOverflow",
            FailureKind::StepMismatch => "stepMismatch",
            FailureKind::BadInput => "badInput",
            FailureKind::CustomError => "customError",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = UnknownFailureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FailureKind::PRECEDENCE
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownFailureKind(s.to_string()))
    }
}

/// Snapshot of a field's validity: one flag per [`FailureKind`].
///
/// Hosts translate their native validity state into this structure so the
/// evaluation logic never touches toolkit types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityReport {
    flags: [bool; 10],
}

impl ValidityReport {
    /// A report with no failing constraint
    pub fn valid() -> Self {
        Self::default()
    }

    /// Build a report with the given kinds set
    pub fn from_failures(kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        let mut report = Self::default();
        for kind in kinds {
            report.set(kind, true);
        }
        report
    }

    pub fn with(mut self, kind: FailureKind) -> Self {
        self.set(kind, true);
        self
    }

    pub fn set(&mut self, kind: FailureKind, failed: bool) {
        self.flags[kind.slot()] = failed;
    }

    pub fn is_set(&self, kind: FailureKind) -> bool {
        self.flags[kind.slot()]
    }

    pub fn is_valid(&self) -> bool {
        !self.flags.iter().any(|failed| *failed)
    }

    /// The highest-precedence failing kind, if any
    pub fn first_failure(&self) -> Option<FailureKind> {
        self.failures().next()
    }

    /// All failing kinds in precedence order
    pub fn failures(&self) -> impl Iterator<Item = FailureKind> + '_ {
        FailureKind::PRECEDENCE
            .into_iter()
            .filter(move |kind| self.is_set(*kind))
    }
}
