//! # cinder
//!
//! Incremental fiber-tree UI renderer for Rust.
//!
//! cinder turns a declarative tree of typed elements into a mutable fiber
//! tree, diffs each new tree positionally against the previously committed
//! one, and applies only the minimal set of mutations to a host rendering
//! surface - yielding cooperatively so the surrounding event loop never
//! blocks for long.
//!
//! ## Architecture
//!
//! ```text
//! Element tree → Fiber tree (work loop, resumable) → Commit → HostBackend
//!                     ↑                                  │
//!                     └──── alternate links ─────────────┘
//! ```
//!
//! The render phase builds and diffs fibers one unit of work at a time,
//! never touching the host; the commit phase applies all effects of a
//! finished pass atomically. Function components hold state in positional
//! hooks; a state dispatch queues an update and requests a fresh full-tree
//! pass from the committed root.
//!
//! ## Driving the loop
//!
//! The renderer is not self-scheduling. An external cooperative scheduler
//! calls [`Renderer::run_work_loop`] during idle slices with a
//! time-remaining query:
//!
//! ```
//! use cinder::{Element, MemoryHost, Props, Renderer};
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut renderer = Renderer::new(host);
//!
//! renderer.render(Element::host("box", Props::new(), vec![Element::text("hi")]), container);
//! while renderer.needs_render() {
//!     renderer.run_work_loop(|| true)?; // real drivers pass a deadline query
//! }
//! assert_eq!(renderer.host().tree_string(container), "root(box(\"hi\"))");
//! # Ok::<(), cinder::RenderError>(())
//! ```
//!
//! ## Modules
//!
//! - [`types`] - foundation types (`PropValue`, `Props`, `EventCallback`)
//! - [`element`] - immutable element model and constructors
//! - [`fiber`] - fiber records and the owning arena
//! - [`renderer`] - render sessions, work loop, reconciliation, commit
//! - [`hooks`] - positional component state (`use_state`, `Dispatch`)
//! - [`host`] - the host mutation interface and the in-memory backend

pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use element::{
    ChildValue, ComponentFn, Element, ElementKind, TEXT_PROP, create_element, create_text_element,
};
pub use error::RenderError;
pub use fiber::{EffectTag, Fiber, FiberArena, FiberId};
pub use hooks::{Dispatch, Hook, Scope, WakeHandle};
pub use host::memory::{MemoryHost, MemoryNode, MemoryNodeId, Mutation};
pub use host::{CHILDREN_KEY, HostBackend, HostError, PropKey, classify};
pub use renderer::{Renderer, WorkStatus};
pub use types::{EventCallback, PropValue, Props};
