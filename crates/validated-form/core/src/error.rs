//! Error types

use thiserror::Error;

/// Errors raised while preparing a custom constraint
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("invalid pattern for field '{field}' (locale '{locale}'): {source}")]
    InvalidPattern {
        field: String,
        locale: String,
        #[source]
        source: regex::Error,
    },
}

/// A failure-kind name that is not one of the DOM validity flags
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown failure kind: {0}")]
pub struct UnknownFailureKind(pub String);
