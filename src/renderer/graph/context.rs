//! Phase-separated frame contexts.
//!
//! Two contexts split the frame the way the hooks split it:
//!
//! - [`PrepareContext`] — mutable, for the **setup** phase. The only
//!   place GPU resources may be created or written.
//! - [`ExecuteContext`] — read-only, for the **execute** phase. Passes
//!   record commands against already-prepared state.
//!
//! Both store individual references to subsystems so the borrow checker
//! can split borrows across disjoint fields.

use glam::{Mat4, Vec3};

use crate::renderer::context::WgpuContext;
use crate::renderer::resources::ResourceManager;
use crate::scene::Scene;

/// Per-camera view state the host supplies for the frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    /// View-projection matrix the fur shaders transform with.
    pub view_proj: Mat4,
    /// Eye position, world space; used for transparent-style ordering.
    pub eye: Vec3,
}

/// The render targets the host bound for this camera.
#[derive(Debug, Clone, Copy)]
pub struct FrameTargets<'a> {
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: Option<&'a wgpu::TextureView>,
}

/// Mutable context for the setup phase.
pub struct PrepareContext<'a> {
    pub wgpu: &'a WgpuContext,
    pub resources: &'a mut ResourceManager,
    pub scene: &'a Scene,
    pub camera: CameraState,
    pub frame_index: u64,
}

/// Read-only context for the execute phase.
pub struct ExecuteContext<'a> {
    pub wgpu: &'a WgpuContext,
    pub resources: &'a ResourceManager,
    pub scene: &'a Scene,
    pub camera: CameraState,
    pub targets: FrameTargets<'a>,
}
