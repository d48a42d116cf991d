//! GPU-driven fur draw building blocks.
//!
//! Each submodule owns one concern of the procedural fur draw:
//!
//! - [`buffers`] — per-frame resolution and leasing of the skinned mesh's
//!   raw GPU buffer handles
//! - [`layers`] — material layer count → per-instance layer index array
//! - [`transform`] — which world matrix places the draw
//! - [`draw`] — the per-frame draw state machine and its descriptor
//!
//! The [`GpuFurPass`](crate::renderer::passes::GpuFurPass) wires these
//! together under the host pipeline's setup/execute/cleanup lifecycle.

pub mod buffers;
pub mod draw;
pub mod layers;
pub mod transform;

/// Property-block slot carrying the deformed vertex buffer.
pub const SLOT_DEFORMED_VERTICES: &str = "fur_deformed_vertices";
/// Property-block slot carrying the static fur attribute buffer.
pub const SLOT_FUR_ATTRIBUTES: &str = "fur_static_attributes";
/// Property-block float array carrying per-instance layer indices.
pub const PROP_LAYER_INDICES: &str = "fur_layer_indices";
