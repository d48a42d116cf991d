//! Error Types
//!
//! The error type [`PeltError`] covers the failure modes that are fatal to
//! pass activation: unresolvable configuration (a named fur target or a
//! transform path that does not exist in the scene at initialization time).
//!
//! Per-frame conditions are deliberately *not* represented here. A buffer
//! handle that cannot be resolved this frame, a degenerate layer count or a
//! missing directional light are all handled locally inside the passes —
//! the host pipeline only ever observes a frame without fur, never an error.

use thiserror::Error;

/// The error type for fur pass configuration.
///
/// All variants are configuration errors: they are raised once during pass
/// initialization and disable the pass for the session. None of them are
/// retried per frame.
#[derive(Error, Debug)]
pub enum PeltError {
    /// The named fur target does not exist in the scene.
    #[error("fur target not found in scene: {0:?}")]
    TargetNotFound(String),

    /// A step of a fixed transform path could not be resolved.
    #[error("transform path step {step:?} not found (walking from {start:?})")]
    PathStepNotFound {
        /// Name of the node the walk started from
        start: String,
        /// The step that failed (`".."` for a missing parent)
        step: String,
    },

    /// A stored node handle no longer points at a live scene node.
    #[error("scene node handle is stale: {0}")]
    StaleNodeHandle(String),
}

/// Alias for `Result<T, PeltError>`.
pub type Result<T> = std::result::Result<T, PeltError>;
