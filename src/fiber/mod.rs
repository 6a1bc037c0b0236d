//! Fiber tree - the mutable, positioned counterpart of the element tree.
//!
//! Fibers live in an owning arena keyed by generational handles. The tree
//! shape is first-child/next-sibling: `child` is the only downward edge,
//! `sibling` chains a parent's children, and `parent`/`alternate` are weak
//! back-references stored as keys. That layout gives the work loop an O(1)
//! preorder step with no explicit traversal stack, and the generational
//! keys mean a stale `alternate` into a freed pass reads back as absent
//! instead of aliasing a recycled slot.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::element::{Element, ElementKind};
use crate::hooks::Hook;
use crate::types::Props;

new_key_type! {
    /// Handle to one fiber in a [`FiberArena`].
    pub struct FiberId;
}

// =============================================================================
// Effect Tag
// =============================================================================

/// Mutation class assigned to a fiber during reconciliation and consumed
/// during commit. Set exactly once per fiber per render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    /// No host mutation required.
    #[default]
    None,
    /// New at this position; materialize and insert a host node at commit.
    Placement,
    /// Same kind at this position; diff props against the alternate.
    Update,
    /// Left over from the previous tree; remove its host nodes at commit.
    Deletion,
}

// =============================================================================
// Fiber
// =============================================================================

/// One unit of work: an element's render state plus tree linkage.
///
/// `N` is the host backend's node handle type. Only host-kind fibers ever
/// own a `host_node`; component fibers are skipped over when the commit
/// phase looks for a host parent.
#[derive(Debug)]
pub struct Fiber<N> {
    /// Discriminant shared with the element that produced this fiber.
    pub kind: ElementKind,
    /// Props for this position.
    pub props: Props,
    /// Host node handle, present only on host-kind fibers once committed
    /// (the root container carries its handle from scheduling).
    pub host_node: Option<N>,
    /// Weak back-reference to the parent fiber.
    pub parent: Option<FiberId>,
    /// First child; the only owning edge.
    pub child: Option<FiberId>,
    /// Next sibling under the same parent.
    pub sibling: Option<FiberId>,
    /// Fiber at the same position in the previously committed tree.
    pub alternate: Option<FiberId>,
    /// Mutation class for the commit phase.
    pub effect: EffectTag,
    /// Positional state slots; component fibers only.
    pub hooks: Vec<Hook>,
    /// Declared children, consumed when the work loop evaluates this fiber.
    /// Retained on the committed root so dispatch-triggered passes
    /// re-reconcile the same top-level element.
    pub element_children: Vec<Element>,
}

impl<N> Fiber<N> {
    /// A fresh, unlinked fiber.
    pub fn new(kind: ElementKind, props: Props) -> Self {
        Self {
            kind,
            props,
            host_node: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::None,
            hooks: Vec::new(),
            element_children: Vec::new(),
        }
    }

    /// Whether this fiber's kind owns a host node.
    pub fn is_host(&self) -> bool {
        self.kind.is_host()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Owning store for every fiber of a render session.
///
/// Both the committed and the in-progress tree live here during a pass;
/// `alternate` keys reach across the two. Superseded subtrees are freed
/// explicitly - nothing in the arena is dropped implicitly by tree edits.
#[derive(Debug, Default)]
pub struct FiberArena<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
}

impl<N> FiberArena<N> {
    /// An empty arena.
    pub fn new() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }

    /// Store a fiber, returning its handle.
    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    /// Look up a fiber.
    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    /// Look up a fiber mutably.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(id)
    }

    /// Whether the handle is live.
    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// The next fiber in preorder: first child, else the nearest ancestor's
    /// unvisited sibling, else none (traversal exhausted).
    ///
    /// This single step is the entire suspension state of the work loop: a
    /// traversal resumed from the returned fiber visits exactly the fibers
    /// an uninterrupted run would, in the same order.
    pub fn next_in_preorder(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(sibling) = self[current].sibling {
                return Some(sibling);
            }
            cursor = self[current].parent;
        }
        None
    }

    /// Free `root` and every descendant, leaving `root`'s own siblings
    /// untouched. Explicit work stack; depth does not recurse.
    pub fn free_subtree(&mut self, root: FiberId) {
        let mut stack: SmallVec<[FiberId; 16]> = SmallVec::new();
        if let Some(child) = self.get(root).and_then(|fiber| fiber.child) {
            stack.push(child);
        }
        while let Some(id) = stack.pop() {
            if let Some(fiber) = self.fibers.remove(id) {
                if let Some(child) = fiber.child {
                    stack.push(child);
                }
                if let Some(sibling) = fiber.sibling {
                    stack.push(sibling);
                }
            }
        }
        self.fibers.remove(root);
    }
}

impl<N> std::ops::Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id]
    }
}

impl<N> std::ops::IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id]
    }
}
