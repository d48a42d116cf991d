//! Layer parameter building.
//!
//! The material stores the shell layer count as a float property; the
//! instance count is its floor truncation, clamped at zero. The builder
//! produces the ordered per-instance layer index array `[0, 1, …, n-1]`
//! the shader uses to select each instance's shell offset.
//!
//! A zero instance count is not a skip condition: the orchestrator still
//! issues the draw with zero instances so per-frame bookkeeping stays
//! uniform.

use crate::resources::material::FurMaterial;

/// Ordered per-instance layer indices for one frame's draw.
///
/// Regenerated every frame from the material — the count may be animated,
/// and rebuilding a few dozen floats is cheaper than tracking staleness.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInstanceSet {
    indices: Vec<f32>,
}

impl LayerInstanceSet {
    /// Builds the layer set from the material's float layer count.
    ///
    /// Fractional counts truncate toward zero; negative, NaN and infinite
    /// values degrade to an empty set.
    #[must_use]
    pub fn from_material(material: &FurMaterial) -> Self {
        Self::with_count(instance_count_from(material.layer_count))
    }

    /// Builds a layer set with exactly `count` entries.
    #[must_use]
    pub fn with_count(count: u32) -> Self {
        Self {
            indices: (0..count).map(|i| i as f32).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[f32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Floor-truncates a float layer-count property into an instance count.
#[must_use]
pub fn instance_count_from(layer_count: f32) -> u32 {
    if layer_count.is_finite() && layer_count > 0.0 {
        layer_count.floor() as u32
    } else {
        0
    }
}
