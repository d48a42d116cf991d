//! Draw placement.
//!
//! One world matrix places the whole procedural draw each frame — shell
//! offsets happen in the shader, never via per-instance matrices. Which
//! node supplies that matrix is configuration: the fur renderer's own
//! node, or a named ancestor reached by a fixed [`TransformPath`] when the
//! geometry follows a skeleton root that moves independently of the
//! renderer node.

use glam::Mat4;

use crate::errors::Result;
use crate::scene::path::TransformPath;
use crate::scene::{NodeHandle, Scene};

/// Where the draw's world matrix comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransformMode {
    /// The target node's own object-to-world matrix.
    #[default]
    OwnNode,
    /// The world matrix of the node a fixed path lands on.
    Ancestor(TransformPath),
}

/// A resolved transform source.
///
/// Resolution happens once, at pass initialization; a broken path is a
/// fatal configuration error there, not a per-frame condition. Per frame
/// the binding is a plain node read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformBinding {
    node: NodeHandle,
}

impl TransformBinding {
    /// Resolves `mode` against the scene, starting from the target node.
    pub fn resolve(mode: &TransformMode, scene: &Scene, target: NodeHandle) -> Result<Self> {
        let node = match mode {
            TransformMode::OwnNode => target,
            TransformMode::Ancestor(path) => path.resolve(scene, target)?,
        };
        Ok(Self { node })
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// The bound node's world matrix this frame, or `None` if the node
    /// has since been removed from the scene (treated as a transient
    /// skip, like a failed buffer resolution).
    #[must_use]
    pub fn world_matrix(&self, scene: &Scene) -> Option<Mat4> {
        scene
            .node(self.node)
            .map(|n| n.transform.world_matrix_as_mat4())
    }
}
