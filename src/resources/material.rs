//! Fur material state.
//!
//! [`FurMaterial`] carries the shader-facing fur parameters. The layer
//! count is stored as `f32` and floor-truncated when instance counts are
//! derived, mirroring how the property reaches the shader as a float.
//!
//! [`PropertyBlock`] is the per-object binding surface: resolved buffer
//! handles and per-instance float arrays attach here, never to the shared
//! `FurMaterial` itself. With per-object blocks, two fur targets rendered
//! in the same frame cannot clobber each other's buffer bindings.

use glam::Vec3;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::resources::buffer::BufferRef;

// ─── Fur Material ─────────────────────────────────────────────────────────────

/// Shared fur material parameters.
#[derive(Debug, Clone)]
pub struct FurMaterial {
    id: Uuid,
    pub name: String,

    /// Number of shell layers, as the shader property stores it.
    /// Fractional values truncate toward zero; values below zero degrade
    /// to an empty (zero-instance) draw rather than an error.
    pub layer_count: f32,

    /// World-space offset between consecutive shell layers.
    pub shell_spacing: f32,
    /// Strand taper across the shell stack, `0.0..=1.0`.
    pub shell_thickness: f32,

    /// Index of the layer this instance draws (shell technique only;
    /// pooled per-layer instances each carry their own).
    pub layer_index: u32,

    /// Direction toward the dominant directional light, world space.
    /// `None` when no directional light was resolved; the binding is then
    /// omitted and the shader falls back to unlit transport.
    pub light_dir: Option<Vec3>,
}

impl FurMaterial {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            layer_count: 16.0,
            shell_spacing: 0.01,
            shell_thickness: 0.6,
            layer_index: 0,
            light_dir: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn with_layer_count(mut self, layer_count: f32) -> Self {
        self.layer_count = layer_count;
        self
    }

    #[must_use]
    pub fn with_shell_spacing(mut self, spacing: f32) -> Self {
        self.shell_spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_shell_thickness(mut self, thickness: f32) -> Self {
        self.shell_thickness = thickness;
        self
    }

    /// Clones this material for one shell layer of a pooled layer set.
    ///
    /// Copies every property, stamps the layer index, and assigns a fresh
    /// identity so per-layer GPU state is keyed independently.
    #[must_use]
    pub fn shell_instance(&self, layer_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("{}#{layer_index}", self.name),
            layer_index,
            ..self.clone()
        }
    }
}

// ─── Property Block ───────────────────────────────────────────────────────────

/// Per-object shader bindings.
///
/// Holds resolved buffer handles (keyed by slot name) and per-instance
/// float arrays. One block belongs to exactly one pass/target pair and is
/// rebound every frame from freshly resolved handles.
#[derive(Debug, Clone, Default)]
pub struct PropertyBlock {
    buffers: FxHashMap<String, BufferRef>,
    float_arrays: FxHashMap<String, Vec<f32>>,
}

impl PropertyBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a buffer handle to a named slot, replacing any previous handle.
    pub fn set_buffer(&mut self, slot: &str, buffer: BufferRef) {
        self.buffers.insert(slot.to_string(), buffer);
    }

    #[must_use]
    pub fn buffer(&self, slot: &str) -> Option<&BufferRef> {
        self.buffers.get(slot)
    }

    /// Sets a per-instance float array property.
    pub fn set_float_array(&mut self, name: &str, values: Vec<f32>) {
        self.float_arrays.insert(name.to_string(), values);
    }

    #[must_use]
    pub fn float_array(&self, name: &str) -> Option<&[f32]> {
        self.float_arrays.get(name).map(Vec::as_slice)
    }

    /// Drops all bindings. Called when a pass is disabled mid-session so
    /// stale handles do not outlive their frame.
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.float_arrays.clear();
    }
}
