//! Fixed hierarchical transform paths.
//!
//! When a fur target's geometry is driven by a skeleton whose root moves
//! independently of the renderer's own node, the procedural draw must take
//! its world matrix from a specific ancestor (e.g. the skeleton root bone)
//! instead. [`TransformPath`] describes that route as a fixed sequence of
//! steps walked from the target node.
//!
//! Paths are configuration: they are resolved exactly once, at pass
//! initialization, and a missing node anywhere along the route is a fatal
//! configuration error — never a per-frame condition.

use crate::errors::{PeltError, Result};
use crate::scene::{NodeHandle, Scene};

/// One step of a transform path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Move to the parent node.
    Parent,
    /// Move to the child with the given name.
    Child(String),
}

/// A fixed route through the scene hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformPath {
    steps: Vec<PathStep>,
}

impl TransformPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a slash-separated route, `".."` meaning "parent":
    /// `"../Armature/root"` walks up once, then down into `Armature`,
    /// then into `root`. Empty segments are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let steps = path
            .split('/')
            .filter(|seg| !seg.is_empty())
            .map(|seg| {
                if seg == ".." {
                    PathStep::Parent
                } else {
                    PathStep::Child(seg.to_string())
                }
            })
            .collect();
        Self { steps }
    }

    /// Appends a parent step.
    #[must_use]
    pub fn parent(mut self) -> Self {
        self.steps.push(PathStep::Parent);
        self
    }

    /// Appends a named-child step.
    #[must_use]
    pub fn child(mut self, name: &str) -> Self {
        self.steps.push(PathStep::Child(name.to_string()));
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Walks the path from `start`, returning the node it lands on.
    ///
    /// Fails with [`PeltError::PathStepNotFound`] if any step cannot be
    /// taken: a parent step on a root node, or a child step whose name no
    /// child carries.
    pub fn resolve(&self, scene: &Scene, start: NodeHandle) -> Result<NodeHandle> {
        let start_name = scene
            .node(start)
            .map(|n| n.name.clone())
            .ok_or_else(|| PeltError::StaleNodeHandle("transform path start".to_string()))?;

        let mut current = start;
        for step in &self.steps {
            let next = match step {
                PathStep::Parent => scene.node(current).and_then(super::Node::parent),
                PathStep::Child(name) => scene.child_by_name(current, name),
            };
            current = next.ok_or_else(|| PeltError::PathStepNotFound {
                start: start_name.clone(),
                step: match step {
                    PathStep::Parent => "..".to_string(),
                    PathStep::Child(name) => name.clone(),
                },
            })?;
        }
        Ok(current)
    }
}
