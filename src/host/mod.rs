//! Host mutation interface.
//!
//! The renderer never touches a rendering surface directly; every native
//! mutation goes through [`HostBackend`], and only during the commit phase.
//! The render phase (element evaluation, reconciliation, traversal) is pure
//! with respect to the host, which is what lets an abandoned in-progress
//! pass disappear without any host-visible effect.
//!
//! # Property classification
//!
//! Prop keys fall into three classes, decided by [`classify`]:
//!
//! - keys starting with `"on"` are event bindings; the event type is the
//!   remainder of the key, ASCII-lowercased (`"onClick"` binds `"click"`),
//! - the reserved key `"children"` is never applied to the host,
//! - everything else is a plain property.

pub mod memory;

use std::fmt;

use thiserror::Error;

use crate::types::{EventCallback, PropValue};

/// Reserved prop key that is never applied as a host property.
pub const CHILDREN_KEY: &str = "children";

/// Prefix marking a prop key as an event binding.
const EVENT_PREFIX: &str = "on";

// =============================================================================
// Errors
// =============================================================================

/// Failure reported by a host backend.
///
/// The renderer does not retry: a host error during commit aborts the rest
/// of that commit pass and the pass is not promoted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// A host error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

// =============================================================================
// Prop Key Classification
// =============================================================================

/// Classification of one prop key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKey {
    /// Event binding; carries the case-normalized event type.
    Event(String),
    /// The reserved children key, skipped during prop application.
    Children,
    /// Plain host property.
    Attribute,
}

/// Classify a prop key as event binding, reserved children key, or plain
/// property.
pub fn classify(key: &str) -> PropKey {
    if key == CHILDREN_KEY {
        PropKey::Children
    } else if let Some(event) = key.strip_prefix(EVENT_PREFIX) {
        PropKey::Event(event.to_ascii_lowercase())
    } else {
        PropKey::Attribute
    }
}

// =============================================================================
// Host Backend
// =============================================================================

/// The external rendering surface.
///
/// Implementations own the native node tree; the renderer only holds cloned
/// node handles inside fibers. All methods are called exclusively from the
/// commit phase, in the exact order the effect walk produces.
pub trait HostBackend {
    /// Opaque handle to one native node.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Create a native node for a host tag.
    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError>;

    /// Create an empty native text node; content arrives via
    /// [`set_property`](Self::set_property) on the text prop.
    fn create_text_node(&mut self) -> Result<Self::Node, HostError>;

    /// Set a plain property on a node.
    fn set_property(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;

    /// Remove a plain property from a node.
    fn clear_property(&mut self, node: &Self::Node, key: &str) -> Result<(), HostError>;

    /// Bind an event listener.
    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventCallback,
    ) -> Result<(), HostError>;

    /// Unbind a previously bound event listener.
    fn remove_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventCallback,
    ) -> Result<(), HostError>;

    /// Append `child` under `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Remove `child` from `parent`, dropping the child's subtree.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
}
