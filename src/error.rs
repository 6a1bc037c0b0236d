//! Error types for the render pipeline.

use thiserror::Error;

use crate::host::HostError;

/// Errors surfaced by the renderer.
///
/// A failed work-loop step or commit abandons the in-progress pass; the
/// committed tree is never left half-updated by these errors, and the
/// renderer keeps servicing later render requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// An element reached the work loop with an unusable host tag.
    #[error("invalid element: {0:?} is not a usable host tag")]
    InvalidElement(String),

    /// A hook was used inconsistently with the previous render of the same
    /// component position.
    #[error("invalid hook call: {0}")]
    InvalidHookCall(String),

    /// The host backend rejected a mutation during commit. The failing pass
    /// was not promoted to the committed tree.
    #[error("host mutation failed: {0}")]
    HostMutation(#[from] HostError),
}
