//! Commit phase - atomic application of a finished pass to the host.
//!
//! Deletions go first, then a single preorder walk of the in-progress tree
//! applies placements and updates. Every walk here uses an explicit work
//! stack so tree depth never becomes call-stack depth. On success the pass
//! is promoted and the superseded tree is freed; on a host failure the pass
//! is dropped instead, leaving the committed tree's bookkeeping untouched.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::element::ElementKind;
use crate::fiber::{EffectTag, FiberId};
use crate::host::{HostBackend, HostError, PropKey, classify};
use crate::types::{PropValue, Props};

use super::Renderer;

impl<H: HostBackend> Renderer<H> {
    /// Apply every pending effect and promote the in-progress tree.
    ///
    /// Non-interruptible: runs to completion (or to the first host error)
    /// within the invocation that exhausted the traversal.
    pub(crate) fn commit_root(&mut self) -> Result<(), crate::error::RenderError> {
        let Some(wip) = self.wip_root else {
            return Ok(());
        };

        match self.apply_effects(wip) {
            Ok(()) => {
                if let Some(old_root) = self.committed_root.take() {
                    self.arena.free_subtree(old_root);
                }
                self.committed_root = Some(wip);
                self.wip_root = None;
                self.next_unit = None;
                self.deletions.clear();
                debug!(fibers = self.arena.len(), "commit complete");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "commit aborted; previous committed tree kept");
                self.abandon_wip("commit aborted by host failure");
                Err(crate::error::RenderError::HostMutation(error))
            }
        }
    }

    fn apply_effects(&mut self, wip_root: FiberId) -> Result<(), HostError> {
        let deletions = std::mem::take(&mut self.deletions);
        for deleted in deletions {
            self.commit_deletion(deleted)?;
        }

        let mut stack: Vec<FiberId> = Vec::new();
        if let Some(child) = self.arena[wip_root].child {
            stack.push(child);
        }
        while let Some(id) = stack.pop() {
            match self.arena[id].effect {
                EffectTag::Placement => self.commit_placement(id)?,
                EffectTag::Update => self.commit_update(id)?,
                // Deletions never link into the new tree.
                EffectTag::Deletion | EffectTag::None => {}
            }
            // Sibling below child: the next pop processes the child, so the
            // walk is preorder, children before later siblings.
            if let Some(sibling) = self.arena[id].sibling {
                stack.push(sibling);
            }
            if let Some(child) = self.arena[id].child {
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Nearest ancestor-owned host node, skipping component fibers.
    fn host_parent_of(&self, id: FiberId) -> Option<H::Node> {
        let mut cursor = self.arena[id].parent;
        while let Some(parent) = cursor {
            if let Some(node) = &self.arena[parent].host_node {
                return Some(node.clone());
            }
            cursor = self.arena[parent].parent;
        }
        None
    }

    /// Materialize a placed fiber's node, apply its props, and insert it
    /// under the nearest host ancestor. Component fibers place nothing.
    fn commit_placement(&mut self, id: FiberId) -> Result<(), HostError> {
        let node = match self.arena[id].kind.clone() {
            ElementKind::Host(tag) => self.host.create_node(&tag)?,
            ElementKind::Text => self.host.create_text_node()?,
            ElementKind::Component(_) => return Ok(()),
        };

        let props = self.arena[id].props.clone();
        apply_props(&mut self.host, &node, &Props::new(), &props)?;
        self.arena[id].host_node = Some(node.clone());

        if let Some(parent_node) = self.host_parent_of(id) {
            self.host.append_child(&parent_node, &node)?;
        }
        Ok(())
    }

    /// Diff the alternate's props against the new props on a kept node.
    fn commit_update(&mut self, id: FiberId) -> Result<(), HostError> {
        let Some(node) = self.arena[id].host_node.clone() else {
            return Ok(());
        };
        let prev_props = self.arena[id]
            .alternate
            .and_then(|alternate| self.arena.get(alternate))
            .map(|alternate| alternate.props.clone())
            .unwrap_or_default();
        let next_props = self.arena[id].props.clone();
        apply_props(&mut self.host, &node, &prev_props, &next_props)
    }

    /// Remove every nearest host-owning descendant of a deleted fiber from
    /// its host parent. A component fiber may own none itself but several
    /// through different children; all of them go.
    fn commit_deletion(&mut self, id: FiberId) -> Result<(), HostError> {
        let Some(parent_node) = self.host_parent_of(id) else {
            return Ok(());
        };

        let mut stack: SmallVec<[FiberId; 8]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena[current].host_node.clone() {
                // The host drops the whole native subtree with this node.
                self.host.remove_child(&parent_node, &node)?;
            } else {
                let mut child = self.arena[current].child;
                while let Some(child_id) = child {
                    stack.push(child_id);
                    child = self.arena[child_id].sibling;
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Prop Application
// =============================================================================

/// Apply the difference between two prop maps to a host node.
///
/// Removed and changed listeners are unbound before changed and new ones
/// are bound; removed plain props are cleared; changed and new plain props
/// are set. Equal maps issue no host calls at all. The reserved children
/// key never reaches the host.
fn apply_props<H: HostBackend>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
) -> Result<(), HostError> {
    for (key, value) in prev.iter() {
        match classify(key) {
            PropKey::Event(event) => {
                if next.get(key) != Some(value) {
                    if let PropValue::Handler(handler) = value {
                        host.remove_listener(node, &event, handler)?;
                    }
                }
            }
            PropKey::Attribute => {
                if !next.contains(key) {
                    host.clear_property(node, key)?;
                }
            }
            PropKey::Children => {}
        }
    }

    for (key, value) in next.iter() {
        if prev.get(key) == Some(value) {
            continue;
        }
        match classify(key) {
            PropKey::Event(event) => {
                if let PropValue::Handler(handler) = value {
                    host.add_listener(node, &event, handler)?;
                }
            }
            PropKey::Attribute => host.set_property(node, key, value)?,
            PropKey::Children => {}
        }
    }
    Ok(())
}
