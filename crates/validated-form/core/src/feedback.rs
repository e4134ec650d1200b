//! Feedback presenter: the lifecycle of error nodes shown next to fields
//!
//! A node is inserted right after its field, made visible, and with a
//! duration hidden at `D` and destroyed at `D + EXIT_GRACE`. Each field has
//! at most one presenter-inserted node at any time.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::field::Field;
use crate::messages::Message;

/// Time between hiding a node and removing it, left for the exit transition
pub const EXIT_GRACE: Duration = Duration::from_millis(1000);

/// CSS class of default feedback nodes
pub const FEEDBACK_CLASS: &str = "error-msg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A default feedback node, as handed to the surface for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackNode {
    pub id: NodeId,
    /// Identity of the field the node belongs to
    pub field: String,
    pub text: String,
    pub class_name: String,
    pub width: Option<String>,
    pub offset_left: f64,
}

/// What to show for a failing field
#[derive(Debug, Clone)]
pub enum FeedbackContent {
    /// Build a default node carrying this message
    Message(Message),
    /// A node the caller created and placed itself (see [`FeedbackPresenter::reserve_node_id`])
    Custom(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Show,
    Hide,
    Destroy,
}

/// A deferred step of a node's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTask {
    pub node: NodeId,
    pub action: TimerAction,
}

/// The UI tree as far as feedback is concerned
pub trait FeedbackSurface {
    /// Insert `node` as the next sibling of the field named by `node.field`
    fn insert_after_field(&mut self, node: &FeedbackNode);

    fn remove(&mut self, node: NodeId);

    fn set_visible(&mut self, node: NodeId, visible: bool);
}

/// Fire-and-forget timers; the host hands each task back to
/// [`FeedbackPresenter::fire`] once `delay` has elapsed
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: TimerTask);
}

pub struct FeedbackPresenter<S> {
    surface: S,
    by_field: HashMap<String, NodeId>,
    live: HashSet<NodeId>,
    next_id: u64,
}

impl<S: FeedbackSurface> FeedbackPresenter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            by_field: HashMap::new(),
            live: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Allocate an id for a caller-built node passed as [`FeedbackContent::Custom`]
    pub fn reserve_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// The node currently shown for `field_id`, default or custom
    pub fn live_node(&self, field_id: &str) -> Option<NodeId> {
        self.by_field.get(field_id).copied()
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.live.contains(&node)
    }

    /// Mark `field` errored and show `content` next to it
    pub fn show_error(
        &mut self,
        field: &mut dyn Field,
        field_id: &str,
        content: FeedbackContent,
        duration: Option<Duration>,
        scheduler: &dyn Scheduler,
    ) -> NodeId {
        field.set_error_state(true);

        let node_id = match content {
            FeedbackContent::Custom(id) => {
                if self.live_node(field_id) != Some(id) {
                    self.dismiss(field_id);
                }
                self.by_field.insert(field_id.to_string(), id);
                self.live.insert(id);
                id
            }
            FeedbackContent::Message(message) => {
                let geometry = field.geometry();
                let node = FeedbackNode {
                    id: self.reserve_node_id(),
                    field: field_id.to_string(),
                    text: message.resolve(),
                    class_name: FEEDBACK_CLASS.to_string(),
                    width: geometry.width,
                    offset_left: geometry.offset_left,
                };

                self.dismiss(field_id);
                self.surface.insert_after_field(&node);
                self.by_field.insert(node.field.clone(), node.id);
                self.live.insert(node.id);
                node.id
            }
        };

        tracing::debug!(field = field_id, node = node_id.get(), ?duration, "showing feedback");

        match duration {
            Some(duration) => {
                scheduler.schedule(Duration::ZERO, TimerTask { node: node_id, action: TimerAction::Show });
                scheduler.schedule(duration, TimerTask { node: node_id, action: TimerAction::Hide });
                scheduler.schedule(
                    duration + EXIT_GRACE,
                    TimerTask { node: node_id, action: TimerAction::Destroy },
                );
            }
            None => self.surface.set_visible(node_id, true),
        }

        node_id
    }

    /// Run a scheduled step. Returns false when the node is already gone.
    pub fn fire(&mut self, task: TimerTask) -> bool {
        if !self.live.contains(&task.node) {
            tracing::debug!(node = task.node.get(), action = ?task.action, "feedback node gone, skipping");
            return false;
        }

        match task.action {
            TimerAction::Show => self.surface.set_visible(task.node, true),
            TimerAction::Hide => self.surface.set_visible(task.node, false),
            TimerAction::Destroy => self.destroy(task.node),
        }
        true
    }

    /// Drop the errored state and any live node of a field found valid
    pub fn clear(&mut self, field: &mut dyn Field, field_id: &str) {
        field.set_error_state(false);
        self.dismiss(field_id);
    }

    /// Remove the live node of `field_id`, leaving its errored state alone
    pub fn dismiss(&mut self, field_id: &str) {
        if let Some(node) = self.by_field.remove(field_id) {
            self.destroy(node);
        }
    }

    fn destroy(&mut self, node: NodeId) {
        if self.live.remove(&node) {
            self.surface.remove(node);
        }
        self.by_field.retain(|_, live| *live != node);
    }
}
