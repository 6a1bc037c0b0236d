//! Renderer - render session state and the cooperative work loop.
//!
//! One `Renderer` owns everything a single render root needs:
//!
//! ```text
//! render(element) → wip tree ──▶ work loop (one fiber per step, resumable)
//!                                   │ reconcile children positionally
//!                                   ▼
//!                              commit phase (atomic) ──▶ HostBackend
//!                                   │
//!                                   ▼
//!                              committed tree (alternate for next pass)
//! ```
//!
//! The loop performs no work between invocations; an external cooperative
//! scheduler calls [`Renderer::run_work_loop`] during idle slices with a
//! time-budget query. The only state that survives a suspension is the
//! traversal cursor plus the partially built tree, so resumption needs
//! nothing from the interrupted call stack.

mod commit;
mod reconcile;

use tracing::{debug, trace, warn};

use crate::element::{ComponentFn, Element, ElementKind};
use crate::error::RenderError;
use crate::fiber::{Fiber, FiberArena, FiberId};
use crate::hooks::{Hook, Scope, WakeHandle};
use crate::host::HostBackend;
use crate::types::Props;

/// Tag carried by the synthetic root fiber wrapping the host container.
const ROOT_TAG: &str = "#root";

// =============================================================================
// Work Status
// =============================================================================

/// Outcome of one `run_work_loop` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// No render work pending.
    Idle,
    /// The time budget ran out mid-traversal; call again to resume.
    Yielded,
    /// Traversal finished and the pass was committed.
    Committed,
}

// =============================================================================
// Renderer
// =============================================================================

/// A single render root: host backend, fiber arena, and session state.
///
/// All shared mutable state of the reference design (committed root,
/// in-progress root, traversal cursor, deletion list, render cursor) lives
/// here as plain fields, so independent roots are independent values.
pub struct Renderer<H: HostBackend> {
    host: H,
    arena: FiberArena<H::Node>,
    committed_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    wake: WakeHandle,
}

impl<H: HostBackend> Renderer<H> {
    /// A renderer driving the given host backend.
    pub fn new(host: H) -> Self {
        Self {
            host,
            arena: FiberArena::new(),
            committed_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            wake: WakeHandle::new(),
        }
    }

    /// Borrow the host backend.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Borrow the host backend mutably (event dispatch, inspection).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The wake flag shared with every dispatch this renderer hands out.
    pub fn wake_handle(&self) -> WakeHandle {
        self.wake.clone()
    }

    /// Whether no render work is pending.
    pub fn is_idle(&self) -> bool {
        self.next_unit.is_none() && self.wip_root.is_none() && !self.wake.is_requested()
    }

    /// Whether the driver should grant further idle slices.
    pub fn needs_render(&self) -> bool {
        !self.is_idle()
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Request a render of `element` into the host `container`.
    ///
    /// Only schedules: the actual tree build happens across subsequent
    /// [`run_work_loop`](Self::run_work_loop) invocations. A pass already
    /// mid-traversal is abandoned with no host-visible effect.
    pub fn render(&mut self, element: Element, container: H::Node) {
        self.abandon_wip("render request supersedes in-progress pass");

        let mut root = Fiber::new(ElementKind::Host(ROOT_TAG.to_string()), Props::new());
        root.host_node = Some(container);
        root.element_children = vec![element];
        root.alternate = self.committed_root;

        let root_id = self.arena.insert(root);
        self.wip_root = Some(root_id);
        self.next_unit = Some(root_id);
        self.deletions.clear();
        debug!("scheduled render pass");
    }

    /// Start a fresh pass from the committed tree (dispatch-triggered).
    /// Returns false when nothing has been committed yet.
    fn begin_pass_from_committed(&mut self) -> bool {
        let Some(committed) = self.committed_root else {
            return false;
        };
        self.abandon_wip("state dispatch supersedes in-progress pass");

        let committed_fiber = &self.arena[committed];
        let mut root = Fiber::new(committed_fiber.kind.clone(), committed_fiber.props.clone());
        root.host_node = committed_fiber.host_node.clone();
        root.element_children = committed_fiber.element_children.clone();
        root.alternate = Some(committed);

        let root_id = self.arena.insert(root);
        self.wip_root = Some(root_id);
        self.next_unit = Some(root_id);
        self.deletions.clear();
        debug!("scheduled render pass from committed tree");
        true
    }

    /// Discard the in-progress pass, if any. Nothing of it ever reached the
    /// host, so this is invisible to the surface.
    fn abandon_wip(&mut self, reason: &str) {
        if let Some(wip) = self.wip_root.take() {
            warn!(reason, "abandoning in-progress render pass");
            self.arena.free_subtree(wip);
        }
        self.next_unit = None;
        self.deletions.clear();
    }

    // =========================================================================
    // Work Loop
    // =========================================================================

    /// Run render work until the traversal is exhausted or `has_budget`
    /// reports the time slice is spent.
    ///
    /// Invoke repeatedly from a cooperative scheduler; the loop is not
    /// self-scheduling. Each iteration performs exactly one unit of work
    /// and stores the next traversal cursor, so an interrupted traversal
    /// resumes where it stopped - same fibers, same order, none repeated.
    /// When the traversal completes, the commit phase runs to completion in
    /// the same invocation regardless of remaining budget.
    ///
    /// # Errors
    ///
    /// A failing unit of work or a failing commit abandons the pass and
    /// surfaces here; the committed tree and the session stay usable.
    pub fn run_work_loop(
        &mut self,
        mut has_budget: impl FnMut() -> bool,
    ) -> Result<WorkStatus, RenderError> {
        if self.wake.take() && !self.begin_pass_from_committed() && self.wip_root.is_none() {
            warn!("state dispatched before first commit; no tree to re-render");
        }

        while let Some(unit) = self.next_unit {
            if !has_budget() {
                return Ok(WorkStatus::Yielded);
            }
            match self.perform_unit(unit) {
                Ok(next) => self.next_unit = next,
                Err(error) => {
                    self.abandon_wip("work-loop step failed");
                    return Err(error);
                }
            }
        }

        if self.wip_root.is_some() {
            self.commit_root()?;
            return Ok(WorkStatus::Committed);
        }
        Ok(WorkStatus::Idle)
    }

    /// Process one fiber and return the next preorder cursor.
    fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>, RenderError> {
        trace!(fiber = ?self.arena[id].kind, "perform unit");
        match self.arena[id].kind.clone() {
            ElementKind::Host(tag) => {
                if tag.is_empty() {
                    return Err(RenderError::InvalidElement(tag));
                }
                self.update_host(id);
            }
            ElementKind::Text => self.update_host(id),
            ElementKind::Component(component) => self.update_component(id, component)?,
        }
        Ok(self.arena.next_in_preorder(id))
    }

    /// Host and text fibers: the fiber's kind and props already describe
    /// the node to materialize at commit, so only children need work.
    fn update_host(&mut self, id: FiberId) {
        let children = self.arena[id].element_children.clone();
        self.reconcile_children(id, &children);
    }

    /// Component fibers: evaluate the function through a fresh hook scope
    /// and reconcile whatever it returns.
    fn update_component(&mut self, id: FiberId, component: ComponentFn) -> Result<(), RenderError> {
        let props = self.arena[id].props.clone();
        let prev_hooks: Vec<Hook> = self.arena[id]
            .alternate
            .and_then(|alternate| self.arena.get(alternate))
            .map(|alternate| alternate.hooks.clone())
            .unwrap_or_default();
        let prev_count = self.arena[id]
            .alternate
            .and_then(|alternate| self.arena.get(alternate))
            .map(|alternate| alternate.hooks.len());

        let mut hooks = Vec::new();
        let mut scope = Scope::new(&prev_hooks, &mut hooks, self.wake.clone());
        let children = component(&mut scope, &props)?;
        let hook_count = scope.hook_count();
        drop(scope);

        // Hook identity is call order; a changed count corrupts state
        // silently, so debug builds reject it outright.
        #[cfg(debug_assertions)]
        if let Some(previous) = prev_count {
            if hook_count != previous {
                return Err(RenderError::InvalidHookCall(format!(
                    "component called {hook_count} hooks, previous render called {previous}"
                )));
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = (prev_count, hook_count);

        self.arena[id].hooks = hooks;
        self.reconcile_children(id, &children);
        Ok(())
    }
}
