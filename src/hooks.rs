//! Hook subsystem - positional state slots for function components.
//!
//! Each component fiber carries an ordered list of hooks. A hook's identity
//! across renders is purely its call position, so a component must call its
//! hooks the same number of times, in the same order, on every render.
//! State updates do not mutate in place: a dispatch queues an action on the
//! slot, and the *next* render folds the queue into the new state.
//!
//! ```text
//! render N:   use_state -> Hook { state, queue Q }  -> Dispatch holds Q
//! (later):    dispatch.update(f)                    -> Q.push(f), wake
//! render N+1: use_state -> fold Q over old state    -> fresh queue
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::RenderError;

/// Type-erased state transition queued by a dispatch.
///
/// Returns `None` when the stored state is not the type the dispatch was
/// created for, which only happens when hook call order was violated.
type Action = Rc<dyn Fn(&dyn Any) -> Option<Rc<dyn Any>>>;

type ActionQueue = Rc<RefCell<Vec<Action>>>;

// =============================================================================
// Hook
// =============================================================================

/// One positional state slot on a component fiber.
#[derive(Clone)]
pub struct Hook {
    state: Rc<dyn Any>,
    queue: ActionQueue,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

// =============================================================================
// Wake Handle
// =============================================================================

/// Re-render request flag shared between a renderer and its dispatches.
///
/// Raising it makes the next `run_work_loop` invocation start a fresh
/// top-level pass from the committed tree. Single-threaded by design, like
/// the rest of the render session.
#[derive(Clone, Debug, Default)]
pub struct WakeHandle(Rc<Cell<bool>>);

impl WakeHandle {
    /// A fresh, unraised handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a re-render.
    pub fn request(&self) {
        self.0.set(true);
    }

    /// Whether a re-render is pending.
    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    /// Consume a pending request.
    pub(crate) fn take(&self) -> bool {
        self.0.replace(false)
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Render context handed to a function component while it is evaluated.
///
/// Holds the previous render's hooks for this tree position and collects
/// the hooks of the current render. Hooks are only reachable through the
/// scope, so a hook call outside a component evaluation cannot be
/// expressed.
pub struct Scope<'a> {
    prev: &'a [Hook],
    hooks: &'a mut Vec<Hook>,
    index: usize,
    wake: WakeHandle,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(prev: &'a [Hook], hooks: &'a mut Vec<Hook>, wake: WakeHandle) -> Self {
        Self {
            prev,
            hooks,
            index: 0,
            wake,
        }
    }

    /// Number of hooks the component has called so far.
    pub(crate) fn hook_count(&self) -> usize {
        self.index
    }

    /// A positional state slot.
    ///
    /// On the first render of this position the state is `initial`. On
    /// later renders it is the previous state with every action dispatched
    /// since the previous render folded in, in dispatch order.
    ///
    /// Returns the current state and a [`Dispatch`] for queueing updates.
    ///
    /// # Errors
    ///
    /// `InvalidHookCall` when the slot at this position held a different
    /// state type on the previous render - the hook-order precondition was
    /// violated.
    pub fn use_state<T: Clone + 'static>(
        &mut self,
        initial: T,
    ) -> Result<(T, Dispatch<T>), RenderError> {
        let slot = self.index;
        self.index += 1;

        let old = self.prev.get(slot);
        let mut state: Rc<dyn Any> = match old {
            Some(hook) => {
                if !hook.state.is::<T>() {
                    return Err(RenderError::InvalidHookCall(format!(
                        "state slot {slot} held a different type on the previous render; \
                         hooks must run in the same order every render"
                    )));
                }
                hook.state.clone()
            }
            None => Rc::new(initial),
        };

        if let Some(hook) = old {
            // Clone the queue out before folding so an action that itself
            // dispatches cannot observe a held borrow.
            let actions: Vec<Action> = hook.queue.borrow().iter().cloned().collect();
            for action in actions {
                state = action(state.as_ref()).ok_or_else(|| {
                    RenderError::InvalidHookCall(format!(
                        "queued update for state slot {slot} no longer matches its type"
                    ))
                })?;
            }
        }

        let queue: ActionQueue = Rc::new(RefCell::new(Vec::new()));
        self.hooks.push(Hook {
            state: state.clone(),
            queue: queue.clone(),
        });

        let value = state
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| {
                RenderError::InvalidHookCall(format!(
                    "queued update for state slot {slot} produced a different type"
                ))
            })?;

        Ok((
            value,
            Dispatch {
                queue,
                wake: self.wake.clone(),
                _marker: PhantomData,
            },
        ))
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Update handle for one state slot.
///
/// Queueing an update never applies it immediately; it lands on the next
/// render pass, which a dispatch also requests via the renderer's wake
/// flag. A dispatch is bound to the render generation that created it: one
/// kept alive across two or more later renders of its slot pushes into a
/// queue no future render reads, and goes stale silently.
pub struct Dispatch<T> {
    queue: ActionQueue,
    wake: WakeHandle,
    _marker: PhantomData<fn(&T) -> T>,
}

impl<T> Clone for Dispatch<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            wake: self.wake.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Dispatch<T> {
    /// Queue a state transition and request a re-render.
    pub fn update(&self, action: impl Fn(&T) -> T + 'static) {
        self.queue.borrow_mut().push(Rc::new(move |state: &dyn Any| {
            state
                .downcast_ref::<T>()
                .map(|state| Rc::new(action(state)) as Rc<dyn Any>)
        }));
        self.wake.request();
    }

    /// Queue a replacement value; shorthand for an update ignoring the
    /// previous state.
    pub fn set(&self, value: T) {
        self.update(move |_| value.clone());
    }
}
