//! Minimal scene graph.
//!
//! Enough scene structure for the fur passes to do their job: a node
//! hierarchy with world-matrix propagation, configuration-time name
//! lookup, directional lights (consumed by the shell technique) and
//! fur-tagged renderable surfaces. Everything else about the scene —
//! cameras, culling, general mesh rendering — belongs to the host
//! pipeline.

pub mod light;
pub mod node;
pub mod path;
pub mod transform;

use glam::Affine3A;
use slotmap::SlotMap;

pub use light::{Light, LightKind};
pub use node::{LightKey, Node, NodeHandle, RenderLayers, SurfaceKey};
pub use transform::Transform;

use crate::resources::buffer::BufferRef;

// ─── Fur Surface ──────────────────────────────────────────────────────────────

/// A renderable surface the shell fur technique can draw.
///
/// References its node for placement and carries classic vertex-stream
/// geometry (the shell technique submits ordinary draws; only the
/// GPU-driven technique pulls raw buffers).
#[derive(Debug, Clone)]
pub struct FurSurface {
    pub node: NodeHandle,
    pub vertex_buffer: BufferRef,
    pub vertex_count: u32,
    pub index_buffer: Option<(BufferRef, u32)>,
    pub layers: RenderLayers,
}

// ─── Scene ────────────────────────────────────────────────────────────────────

/// Node storage plus the component maps the fur passes consume.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
    lights: SlotMap<LightKey, (NodeHandle, Light)>,
    surfaces: SlotMap<SurfaceKey, FurSurface>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes & hierarchy ──────────────────────────────────────────────────

    /// Adds a node as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.roots.push(handle);
        handle
    }

    /// Adds a node as a child of `parent`.
    pub fn add_child(&mut self, parent: NodeHandle, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.attach(parent, handle);
        handle
    }

    /// Re-parents `child` under `parent`, keeping both sides of the
    /// relation in sync.
    pub fn attach(&mut self, parent: NodeHandle, child: NodeHandle) {
        let Some(old_parent) = self.nodes.get_mut(child).map(|n| n.parent.take()) else {
            return;
        };
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(p)) {
            old.children.retain(|&c| c != child);
        }
        self.roots.retain(|&r| r != child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Finds a node by name. Linear scan; configuration-time use only.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(handle, _)| handle)
    }

    /// Finds a direct child of `parent` by name.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeHandle, name: &str) -> Option<NodeHandle> {
        let parent = self.nodes.get(parent)?;
        parent
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes.get(child).is_some_and(|n| n.name == name))
    }

    // ── Lights ─────────────────────────────────────────────────────────────

    pub fn add_light(&mut self, node: NodeHandle, light: Light) -> LightKey {
        self.lights.insert((node, light))
    }

    /// First directional light in registration order, if any.
    ///
    /// The shell pass resolves this once at initialization; a scene with
    /// no directional light is valid and simply renders fur unlit.
    #[must_use]
    pub fn first_directional_light(&self) -> Option<(NodeHandle, &Light)> {
        self.lights
            .iter()
            .map(|(_, (node, light))| (*node, light))
            .find(|(_, light)| light.is_directional())
    }

    // ── Surfaces ───────────────────────────────────────────────────────────

    pub fn add_surface(&mut self, surface: FurSurface) -> SurfaceKey {
        self.surfaces.insert(surface)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKey, &FurSurface)> {
        self.surfaces.iter()
    }

    #[must_use]
    pub fn surface(&self, key: SurfaceKey) -> Option<&FurSurface> {
        self.surfaces.get(key)
    }

    // ── World matrix propagation ───────────────────────────────────────────

    /// Propagates world matrices through the hierarchy, parents before
    /// children. Local matrices are recomputed only where TRS data
    /// changed; world matrices are refreshed unconditionally (the multiply
    /// is cheaper than tracking cross-level dirtiness at this scale).
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A)> = self
            .roots
            .iter()
            .map(|&root| (root, Affine3A::IDENTITY))
            .collect();

        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            node.transform.update_local_matrix();
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
            for &child in &node.children {
                stack.push((child, world));
            }
        }
    }
}
