//! Pass lifecycle.
//!
//! The host pipeline invokes each registered [`RenderNode`] once per
//! camera per frame through three hooks in fixed order — setup, execute,
//! cleanup. [`RenderGraph`] owns the sequencing and the frame's command
//! encoder; the host owns scheduling, submission timing and target
//! binding.

pub mod context;
pub mod graph;
pub mod node;

pub use context::{CameraState, ExecuteContext, FrameTargets, PrepareContext};
pub use graph::RenderGraph;
pub use node::{PassEvent, RenderNode};
