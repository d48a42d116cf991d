//! Render graph executor.
//!
//! Linear execution: nodes are ordered by [`PassEvent`] (stable within an
//! event) and every frame runs all setups, then records all executes into
//! one `CommandEncoder`, submits, and runs all cleanups. Cleanup running
//! after submission is what lets passes release per-frame buffer handles
//! without racing the recorded commands; running it before the next
//! frame's setup is the ordering invariant the orchestrators rely on.

use crate::renderer::context::WgpuContext;
use crate::renderer::graph::context::{CameraState, ExecuteContext, FrameTargets, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::resources::ResourceManager;
use crate::scene::Scene;

/// Ordered list of render nodes with a per-frame driver.
#[derive(Default)]
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
    frame_index: u64,
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, keeping the list sorted by injection event.
    /// Nodes with the same event keep their insertion order.
    pub fn add_node(&mut self, node: Box<dyn RenderNode>) {
        let event = node.event();
        let at = self
            .nodes
            .iter()
            .position(|n| n.event() > event)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(at, node);
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node names in execution order, for diagnostics.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name())
    }

    /// Runs one camera frame: setup → execute → submit → cleanup.
    pub fn run_frame(
        &mut self,
        wgpu_ctx: &WgpuContext,
        resources: &mut ResourceManager,
        scene: &Scene,
        camera: CameraState,
        targets: FrameTargets,
    ) {
        self.frame_index += 1;
        resources.begin_frame(self.frame_index);

        {
            let mut prepare = PrepareContext {
                wgpu: wgpu_ctx,
                resources: &mut *resources,
                scene,
                camera,
                frame_index: self.frame_index,
            };
            for node in &mut self.nodes {
                node.setup(&mut prepare);
            }
        }

        let mut encoder = wgpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fur Graph Encoder"),
            });
        {
            let execute = ExecuteContext {
                wgpu: wgpu_ctx,
                resources: &*resources,
                scene,
                camera,
                targets,
            };
            for node in &mut self.nodes {
                encoder.push_debug_group(node.name());
                node.execute(&execute, &mut encoder);
                encoder.pop_debug_group();
            }
        }
        wgpu_ctx.queue.submit(std::iter::once(encoder.finish()));

        for node in &mut self.nodes {
            node.cleanup();
        }
    }
}
