//! In-memory host backend.
//!
//! `MemoryHost` keeps the node tree in a slotmap and records every mutation
//! the renderer issues, in order. It is the reference surface the crate's
//! tests and demos run against: assertions compare the mutation log, and
//! `emit` plays the role of the host's event dispatch.

use indexmap::IndexMap;
use slotmap::{SlotMap, new_key_type};

use super::{HostBackend, HostError};
use crate::types::{EventCallback, PropValue};

new_key_type! {
    /// Handle to one node in a [`MemoryHost`].
    pub struct MemoryNodeId;
}

// =============================================================================
// Nodes
// =============================================================================

/// One node in the in-memory tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    /// Host tag, or `None` for text nodes.
    pub tag: Option<String>,
    /// Applied plain properties.
    pub props: IndexMap<String, PropValue>,
    /// Bound listeners as (event type, handler) pairs.
    pub listeners: Vec<(String, EventCallback)>,
    /// Attached children, in insertion order.
    pub children: Vec<MemoryNodeId>,
}

impl MemoryNode {
    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }

    /// The text content, for text nodes that received it.
    pub fn text(&self) -> Option<&str> {
        self.props.get(crate::element::TEXT_PROP).and_then(|v| v.as_text())
    }
}

// =============================================================================
// Mutation Log
// =============================================================================

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// A tagged node was created.
    CreateNode {
        /// The new node.
        node: MemoryNodeId,
        /// Its tag.
        tag: String,
    },
    /// A text node was created.
    CreateTextNode {
        /// The new node.
        node: MemoryNodeId,
    },
    /// A plain property was set.
    SetProperty {
        /// Target node.
        node: MemoryNodeId,
        /// Property key.
        key: String,
        /// New value.
        value: PropValue,
    },
    /// A plain property was removed.
    ClearProperty {
        /// Target node.
        node: MemoryNodeId,
        /// Property key.
        key: String,
    },
    /// A listener was bound.
    AddListener {
        /// Target node.
        node: MemoryNodeId,
        /// Event type.
        event: String,
    },
    /// A listener was unbound.
    RemoveListener {
        /// Target node.
        node: MemoryNodeId,
        /// Event type.
        event: String,
    },
    /// A child was attached.
    AppendChild {
        /// Parent node.
        parent: MemoryNodeId,
        /// Attached child.
        child: MemoryNodeId,
    },
    /// A child was detached.
    RemoveChild {
        /// Parent node.
        parent: MemoryNodeId,
        /// Detached child.
        child: MemoryNodeId,
    },
}

// =============================================================================
// Memory Host
// =============================================================================

/// Slotmap-backed [`HostBackend`] with a mutation log.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: SlotMap<MemoryNodeId, MemoryNode>,
    log: Vec<Mutation>,
    failure_countdown: Option<usize>,
}

impl MemoryHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container node outside the renderer's mutation stream.
    ///
    /// The container exists before the first render pass, so it is not
    /// recorded in the log.
    pub fn create_container(&mut self, tag: &str) -> MemoryNodeId {
        self.nodes.insert(MemoryNode {
            tag: Some(tag.to_string()),
            ..MemoryNode::default()
        })
    }

    /// Look up a node.
    pub fn node(&self, id: MemoryNodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    /// Children of a node, empty if the node is unknown.
    pub fn children(&self, id: MemoryNodeId) -> &[MemoryNodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// First node carrying the given tag, in creation order.
    pub fn find_by_tag(&self, tag: &str) -> Option<MemoryNodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.tag.as_deref() == Some(tag))
            .map(|(id, _)| id)
    }

    /// The mutation log so far.
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    /// Drain the mutation log.
    pub fn take_log(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    /// Make every mutation after the next `remaining` ones fail.
    ///
    /// Test lever for the commit-abort path.
    pub fn fail_after(&mut self, remaining: usize) {
        self.failure_countdown = Some(remaining);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&mut self) {
        self.failure_countdown = None;
    }

    /// Invoke every listener bound to `node` for `event`; returns how many
    /// handlers ran.
    pub fn emit(&self, node: MemoryNodeId, event: &str) -> usize {
        let Some(node) = self.nodes.get(node) else {
            return 0;
        };
        let mut fired = 0;
        for (bound, handler) in &node.listeners {
            if bound == event {
                handler.call();
                fired += 1;
            }
        }
        fired
    }

    /// Render the subtree under `id` as a compact string, for assertions.
    ///
    /// Tagged nodes print as `tag(child, ...)`, text nodes as their quoted
    /// content.
    pub fn tree_string(&self, id: MemoryNodeId) -> String {
        let Some(node) = self.nodes.get(id) else {
            return "<missing>".to_string();
        };
        match &node.tag {
            None => format!("{:?}", node.text().unwrap_or("")),
            Some(tag) => {
                if node.children.is_empty() {
                    tag.clone()
                } else {
                    let children: Vec<String> = node
                        .children
                        .iter()
                        .map(|child| self.tree_string(*child))
                        .collect();
                    format!("{tag}({})", children.join(", "))
                }
            }
        }
    }

    fn check_failure(&mut self) -> Result<(), HostError> {
        match self.failure_countdown.as_mut() {
            Some(0) => Err(HostError::new("injected host failure")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn get_mut(&mut self, id: MemoryNodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| HostError::new(format!("unknown node {id:?}")))
    }
}

impl HostBackend for MemoryHost {
    type Node = MemoryNodeId;

    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError> {
        self.check_failure()?;
        let node = self.nodes.insert(MemoryNode {
            tag: Some(tag.to_string()),
            ..MemoryNode::default()
        });
        self.log.push(Mutation::CreateNode {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text_node(&mut self) -> Result<Self::Node, HostError> {
        self.check_failure()?;
        let node = self.nodes.insert(MemoryNode::default());
        self.log.push(Mutation::CreateTextNode { node });
        Ok(node)
    }

    fn set_property(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.check_failure()?;
        self.get_mut(*node)?.props.insert(key.to_string(), value.clone());
        self.log.push(Mutation::SetProperty {
            node: *node,
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_property(&mut self, node: &Self::Node, key: &str) -> Result<(), HostError> {
        self.check_failure()?;
        self.get_mut(*node)?.props.shift_remove(key);
        self.log.push(Mutation::ClearProperty {
            node: *node,
            key: key.to_string(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventCallback,
    ) -> Result<(), HostError> {
        self.check_failure()?;
        self.get_mut(*node)?
            .listeners
            .push((event.to_string(), handler.clone()));
        self.log.push(Mutation::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventCallback,
    ) -> Result<(), HostError> {
        self.check_failure()?;
        let entry = self.get_mut(*node)?;
        let position = entry
            .listeners
            .iter()
            .position(|(bound, bound_handler)| bound == event && bound_handler == handler)
            .ok_or_else(|| HostError::new(format!("no {event:?} listener bound on {node:?}")))?;
        entry.listeners.remove(position);
        self.log.push(Mutation::RemoveListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError> {
        self.check_failure()?;
        if !self.nodes.contains_key(*child) {
            return Err(HostError::new(format!("unknown node {child:?}")));
        }
        self.get_mut(*parent)?.children.push(*child);
        self.log.push(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError> {
        self.check_failure()?;
        let entry = self.get_mut(*parent)?;
        let position = entry
            .children
            .iter()
            .position(|existing| existing == child)
            .ok_or_else(|| {
                HostError::new(format!("{child:?} is not a child of {parent:?}"))
            })?;
        entry.children.remove(position);
        // Drop the detached subtree; handles into it go stale.
        let mut stack = vec![*child];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                stack.extend(node.children);
            }
        }
        self.log.push(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}
