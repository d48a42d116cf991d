use bitflags::bitflags;
use slotmap::new_key_type;

use crate::scene::transform::Transform;

new_key_type! {
    /// Handle to a [`Node`] in a [`Scene`](crate::scene::Scene).
    pub struct NodeHandle;
    /// Handle to a light registered in a scene.
    pub struct LightKey;
    /// Handle to a fur surface registered in a scene.
    pub struct SurfaceKey;
}

bitflags! {
    /// Render classification layers.
    ///
    /// The fur passes filter scene surfaces with these masks, the way the
    /// host pipeline filters renderers by layer: shell fur draws surfaces
    /// tagged [`RenderLayers::FUR`], the GPU-driven pass targets a single
    /// named node tagged [`RenderLayers::GPU_FUR`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderLayers: u32 {
        const DEFAULT = 1;
        const FUR = 1 << 1;
        const GPU_FUR = 1 << 2;
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A scene node: hierarchy links plus a transform.
///
/// Only the data traversed every frame lives here; renderable surfaces,
/// lights and skinning sources are stored in the scene's component maps
/// and point back at nodes by handle.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    /// Node name, used for configuration-time lookup only (never queried
    /// per frame).
    pub name: String,

    /// Transform component (hot data accessed every frame).
    pub transform: Transform,

    pub layers: RenderLayers,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            name: name.to_string(),
            transform: Transform::new(),
            layers: RenderLayers::default(),
        }
    }

    #[must_use]
    pub fn with_layers(mut self, layers: RenderLayers) -> Self {
        self.layers = layers;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}
