//! Render node trait.

use crate::renderer::graph::context::{ExecuteContext, PrepareContext};

/// Where in the host frame a pass is injected.
///
/// Both fur techniques draw over the opaque scene and under the host's
/// transparents, so [`BeforeTransparents`](Self::BeforeTransparents) is
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassEvent {
    BeforeOpaques,
    BeforeTransparents,
    AfterTransparents,
}

/// A render pass with a per-camera, per-frame lifecycle.
///
/// The host calls the hooks in strict order — `setup`, `execute`,
/// `cleanup` — and never overlaps two frames of the same node: setup for
/// frame N+1 begins only after cleanup of frame N returned.
///
/// - `setup` has mutable access to engine subsystems: resolve per-frame
///   resources, upload data, build bind groups.
/// - `execute` records GPU commands against read-only shared state.
/// - `cleanup` releases every per-frame acquisition, on every path —
///   including frames whose setup failed partway and submitted nothing.
pub trait RenderNode {
    /// Node name, for debug groups and diagnostics.
    fn name(&self) -> &str;

    /// Injection point within the host frame.
    fn event(&self) -> PassEvent {
        PassEvent::BeforeTransparents
    }

    /// Frame setup: resource resolution and upload.
    fn setup(&mut self, _ctx: &mut PrepareContext) {}

    /// Records this frame's GPU commands.
    fn execute(&mut self, _ctx: &ExecuteContext, _encoder: &mut wgpu::CommandEncoder) {}

    /// Frame cleanup: release per-frame acquisitions.
    fn cleanup(&mut self) {}
}
