//! Headless host: in-memory fields, feedback surface and a manual clock
//!
//! `MemoryField` reproduces the native constraint checks a browser performs
//! for text, email, url and number inputs, which lets the engine run (and be
//! tested) without a DOM.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::evaluator::SubmitEvent;
use crate::failure::{FailureKind, ValidityReport};
use crate::feedback::{FeedbackNode, FeedbackPresenter, FeedbackSurface, NodeId, Scheduler, TimerTask};
use crate::field::{Field, FieldDescriptor, FieldGeometry};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:\S+$").unwrap()
});

/// Native constraint attributes of a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    /// HTML `pattern` attribute; matched against the whole value
    pub pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryField {
    descriptor: FieldDescriptor,
    constraints: NativeConstraints,
    value: String,
    custom_message: String,
    errored: bool,
    geometry: FieldGeometry,
}

impl MemoryField {
    pub fn new(descriptor: FieldDescriptor) -> Self {
        Self {
            descriptor,
            constraints: NativeConstraints::default(),
            value: String::new(),
            custom_message: String::new(),
            errored: false,
            geometry: FieldGeometry::default(),
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(FieldDescriptor::input(name))
    }

    pub fn button(kind: impl Into<String>) -> Self {
        Self::new(FieldDescriptor::button(kind))
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.descriptor.input_type = Some(input_type.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.descriptor.required = true;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraints.min_length = min;
        self.constraints.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min = min;
        self.constraints.max = max;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.constraints.step = Some(step);
        self
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.geometry.width = Some(width.into());
        self
    }

    pub fn with_offset_left(mut self, offset_left: f64) -> Self {
        self.geometry.offset_left = offset_left;
        self
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn custom_validity(&self) -> &str {
        &self.custom_message
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    fn input_type(&self) -> &str {
        self.descriptor.input_type.as_deref().unwrap_or("text")
    }

    fn check_number(&self, report: &mut ValidityReport) {
        let Ok(number) = self.value.trim().parse::<f64>() else {
            report.set(FailureKind::BadInput, true);
            return;
        };

        if self.constraints.min.is_some_and(|min| number < min) {
            report.set(FailureKind::RangeUnderflow, true);
        }
        if self.constraints.max.is_some_and(|max| number > max) {
            report.set(FailureKind::RangeOverflow, true);
        }
        if let Some(step) = self.constraints.step.filter(|step| *step > 0.0) {
            let base = self.constraints.min.unwrap_or(0.0);
            let steps = (number - base) / step;
            if (steps - steps.round()).abs() > 1e-9 {
                report.set(FailureKind::StepMismatch, true);
            }
        }
    }

    fn check_pattern(&self, report: &mut ValidityReport) {
        let Some(pattern) = self.constraints.pattern.as_deref() else {
            return;
        };
        // an uncompilable pattern attribute is ignored, as browsers do
        if let Ok(regex) = Regex::new(&format!("^(?:{})$", pattern)) {
            if !regex.is_match(&self.value) {
                report.set(FailureKind::PatternMismatch, true);
            }
        }
    }
}

impl Field for MemoryField {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn validity(&self) -> ValidityReport {
        let mut report = ValidityReport::valid();
        report.set(FailureKind::CustomError, !self.custom_message.is_empty());

        if self.value.is_empty() {
            report.set(FailureKind::ValueMissing, self.descriptor.required);
            return report;
        }

        match self.input_type() {
            "email" => report.set(FailureKind::TypeMismatch, !EMAIL_REGEX.is_match(&self.value)),
            "url" => report.set(FailureKind::TypeMismatch, !URL_REGEX.is_match(&self.value)),
            "number" | "range" => self.check_number(&mut report),
            _ => {}
        }

        let length = self.value.chars().count();
        if self.constraints.max_length.is_some_and(|max| length > max) {
            report.set(FailureKind::TooLong, true);
        }
        if self.constraints.min_length.is_some_and(|min| length < min) {
            report.set(FailureKind::TooShort, true);
        }

        self.check_pattern(&mut report);
        report
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.custom_message = message.to_string();
    }

    fn set_error_state(&mut self, errored: bool) {
        self.errored = errored;
    }

    fn geometry(&self) -> FieldGeometry {
        self.geometry.clone()
    }
}

/// Mutations applied to a [`MemorySurface`], in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Inserted(NodeId),
    Removed(NodeId),
    Shown(NodeId),
    Hidden(NodeId),
}

#[derive(Debug, Clone)]
enum Entry {
    Field(String),
    Feedback { node: FeedbackNode, visible: bool },
}

/// Sibling list of fields and feedback nodes, modeling a form's children
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    entries: Vec<Entry>,
    visible_custom: Vec<NodeId>,
    ops: Vec<SurfaceOp>,
}

impl MemorySurface {
    pub fn with_fields<I, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: fields.into_iter().map(|f| Entry::Field(f.into())).collect(),
            ..Self::default()
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&FeedbackNode> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Feedback { node, .. } if node.id == id => Some(node),
            _ => None,
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, Entry::Feedback { node, visible: true } if node.id == id)
        }) || self.visible_custom.contains(&id)
    }

    /// Feedback nodes belonging to `field`
    pub fn feedback_for(&self, field: &str) -> Vec<&FeedbackNode> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Feedback { node, .. } if node.field == field => Some(node),
                _ => None,
            })
            .collect()
    }

    pub fn feedback_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Feedback { .. }))
            .count()
    }

    /// The feedback node directly following `field`, if any
    pub fn next_sibling_of(&self, field: &str) -> Option<NodeId> {
        let position = self.field_position(field)?;
        match self.entries.get(position + 1) {
            Some(Entry::Feedback { node, .. }) => Some(node.id),
            _ => None,
        }
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    fn field_position(&self, field: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| matches!(entry, Entry::Field(name) if name == field))
    }
}

impl FeedbackSurface for MemorySurface {
    fn insert_after_field(&mut self, node: &FeedbackNode) {
        let entry = Entry::Feedback {
            node: node.clone(),
            visible: false,
        };
        match self.field_position(&node.field) {
            Some(position) => self.entries.insert(position + 1, entry),
            None => self.entries.push(entry),
        }
        self.ops.push(SurfaceOp::Inserted(node.id));
    }

    fn remove(&mut self, id: NodeId) {
        self.entries
            .retain(|entry| !matches!(entry, Entry::Feedback { node, .. } if node.id == id));
        self.visible_custom.retain(|custom| *custom != id);
        self.ops.push(SurfaceOp::Removed(id));
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) {
        let mut found = false;
        for entry in &mut self.entries {
            if let Entry::Feedback { node, visible: shown } = entry {
                if node.id == id {
                    *shown = visible;
                    found = true;
                }
            }
        }
        if !found {
            self.visible_custom.retain(|custom| *custom != id);
            if visible {
                self.visible_custom.push(id);
            }
        }
        self.ops.push(if visible {
            SurfaceOp::Shown(id)
        } else {
            SurfaceOp::Hidden(id)
        });
    }
}

/// Virtual clock for scheduled feedback steps
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    sequence: Cell<u64>,
    queue: RefCell<Vec<(Duration, u64, TimerTask)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move the clock forward and return the tasks now due, earliest first
    pub fn advance(&self, by: Duration) -> Vec<TimerTask> {
        let now = self.now.get() + by;
        self.now.set(now);

        let mut queue = self.queue.borrow_mut();
        let (mut due, waiting): (Vec<_>, Vec<_>) = queue.drain(..).partition(|(at, _, _)| *at <= now);
        *queue = waiting;
        due.sort_by_key(|(at, seq, _)| (*at, *seq));
        due.into_iter().map(|(_, _, task)| task).collect()
    }

    /// Advance and hand every due task to `presenter`; returns how many ran
    pub fn advance_and_fire<S: FeedbackSurface>(
        &self,
        by: Duration,
        presenter: &mut FeedbackPresenter<S>,
    ) -> usize {
        self.advance(by)
            .into_iter()
            .filter(|task| presenter.fire(*task))
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let sequence = self.sequence.get();
        self.sequence.set(sequence + 1);
        self.queue
            .borrow_mut()
            .push((self.now.get() + delay, sequence, task));
    }
}

/// Submit event that records whether default navigation was prevented
#[derive(Debug, Clone, Default)]
pub struct MemorySubmitEvent {
    pub default_prevented: bool,
}

impl SubmitEvent for MemorySubmitEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
