//! Validated Form Core
//!
//! Locale-aware constraint validation and transient error feedback for
//! HTML-style forms. The engine never touches a UI toolkit directly: hosts
//! implement [`Field`], [`FeedbackSurface`], [`Scheduler`] and
//! [`SubmitEvent`] over their own element types. The browser host lives in
//! `validated-form-wasm`; [`memory`] provides a headless one.

pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod evaluator;
pub mod failure;
pub mod feedback;
pub mod field;
pub mod live;
pub mod locale;
pub mod memory;
pub mod messages;
pub mod presets;
pub mod registry;

pub use classifier::is_action_trigger;
pub use config::{FeedbackConfig, FormConfig, FormSection};
pub use controller::{Binding, FormController};
pub use error::{ConstraintError, UnknownFailureKind};
pub use evaluator::{FieldFailure, FormValues, SubmissionEvaluator, SubmissionResult, SubmitEvent};
pub use failure::{FailureKind, ValidityReport};
pub use feedback::{
    FeedbackContent, FeedbackNode, FeedbackPresenter, FeedbackSurface, NodeId, Scheduler,
    TimerAction, TimerTask, EXIT_GRACE, FEEDBACK_CLASS,
};
pub use field::{Field, FieldDescriptor, FieldGeometry};
pub use live::{build_live_validator, LiveOutcome, LiveValidator};
pub use locale::{Locale, LocaleSelector, LocaleSource};
pub use messages::{ErrorMessageTable, Message};
pub use registry::{ConstraintRegistry, ConstraintRule};
