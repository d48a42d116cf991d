//! Buffer handle and material binding tests
//!
//! Tests for:
//! - BufferRef identity, versioning and raw-access queries
//! - Per-object property blocks (buffer slots, float arrays, isolation)
//! - Fur material construction and shell instancing

use pelt::renderer::fur::{PROP_LAYER_INDICES, SLOT_DEFORMED_VERTICES};
use pelt::skinning::{DEFORMED_VERTEX_STRIDE, DeformedVertex, FUR_ATTRIBUTE_STRIDE};
use pelt::{BufferRef, FurMaterial, PropertyBlock};

// ============================================================================
// BufferRef
// ============================================================================

#[test]
fn buffer_ids_are_unique_and_shared_by_clones() {
    let a = BufferRef::new(&[1.0f32, 2.0], wgpu::BufferUsages::STORAGE, None);
    let b = BufferRef::new(&[1.0f32, 2.0], wgpu::BufferUsages::STORAGE, None);
    assert_ne!(a.id(), b.id());

    let a2 = a.clone();
    assert_eq!(a.id(), a2.id());
    assert_eq!(a, a2);
}

#[test]
fn buffer_update_bumps_version_and_payload() {
    let buffer = BufferRef::new(&[0u32; 4], wgpu::BufferUsages::INDEX, Some("idx"));
    let before = buffer.version();

    buffer.update(&[1u32, 2, 3]);
    assert!(buffer.version() > before);
    assert_eq!(buffer.byte_len(), 3 * size_of::<u32>());
}

#[test]
fn buffer_supports_checks_all_flags() {
    let buffer = BufferRef::new(
        &[0.0f32],
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        None,
    );
    assert!(buffer.supports(wgpu::BufferUsages::STORAGE));
    assert!(buffer.supports(wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST));
    assert!(!buffer.supports(wgpu::BufferUsages::INDEX));
}

#[test]
fn vertex_layout_strides_match_their_structs() {
    // The WGSL side indexes raw float arrays with these strides; the
    // constants are the contract.
    assert_eq!(DEFORMED_VERTEX_STRIDE, 24);
    assert_eq!(FUR_ATTRIBUTE_STRIDE, 16);

    let vertices = [DeformedVertex {
        position: [1.0, 2.0, 3.0],
        normal: [0.0, 1.0, 0.0],
    }];
    let buffer = BufferRef::new(&vertices, wgpu::BufferUsages::STORAGE, None);
    assert_eq!(buffer.byte_len(), DEFORMED_VERTEX_STRIDE);
}

// ============================================================================
// Property blocks
// ============================================================================

#[test]
fn property_block_binds_and_replaces_buffers() {
    let mut block = PropertyBlock::new();
    let first = BufferRef::new(&[0.0f32], wgpu::BufferUsages::STORAGE, None);
    let second = BufferRef::new(&[0.0f32], wgpu::BufferUsages::STORAGE, None);

    block.set_buffer(SLOT_DEFORMED_VERTICES, first.clone());
    assert_eq!(block.buffer(SLOT_DEFORMED_VERTICES), Some(&first));

    block.set_buffer(SLOT_DEFORMED_VERTICES, second.clone());
    assert_eq!(block.buffer(SLOT_DEFORMED_VERTICES), Some(&second));
}

#[test]
fn property_block_float_arrays_round_trip() {
    let mut block = PropertyBlock::new();
    block.set_float_array(PROP_LAYER_INDICES, vec![0.0, 1.0, 2.0]);
    assert_eq!(
        block.float_array(PROP_LAYER_INDICES),
        Some([0.0, 1.0, 2.0].as_slice())
    );
    assert_eq!(block.float_array("missing"), None);
}

#[test]
fn property_blocks_are_isolated_per_object() {
    // Two fur targets rendered the same frame must not share binding
    // state; each pass owns its own block.
    let mut block_a = PropertyBlock::new();
    let mut block_b = PropertyBlock::new();
    let buffer_a = BufferRef::new(&[0.0f32], wgpu::BufferUsages::STORAGE, None);
    let buffer_b = BufferRef::new(&[0.0f32], wgpu::BufferUsages::STORAGE, None);

    block_a.set_buffer(SLOT_DEFORMED_VERTICES, buffer_a.clone());
    block_b.set_buffer(SLOT_DEFORMED_VERTICES, buffer_b.clone());

    assert_eq!(block_a.buffer(SLOT_DEFORMED_VERTICES), Some(&buffer_a));
    assert_eq!(block_b.buffer(SLOT_DEFORMED_VERTICES), Some(&buffer_b));
}

#[test]
fn property_block_clear_drops_all_bindings() {
    let mut block = PropertyBlock::new();
    block.set_buffer(
        SLOT_DEFORMED_VERTICES,
        BufferRef::new(&[0.0f32], wgpu::BufferUsages::STORAGE, None),
    );
    block.set_float_array(PROP_LAYER_INDICES, vec![0.0]);

    block.clear();
    assert!(block.buffer(SLOT_DEFORMED_VERTICES).is_none());
    assert!(block.float_array(PROP_LAYER_INDICES).is_none());
}

// ============================================================================
// Fur material
// ============================================================================

#[test]
fn material_builder_sets_properties() {
    let material = FurMaterial::new("fur")
        .with_layer_count(32.0)
        .with_shell_spacing(0.05)
        .with_shell_thickness(0.9);
    assert_eq!(material.layer_count, 32.0);
    assert_eq!(material.shell_spacing, 0.05);
    assert_eq!(material.shell_thickness, 0.9);
    assert_eq!(material.layer_index, 0);
}

#[test]
fn shell_instance_stamps_layer_and_new_identity() {
    let base = FurMaterial::new("fur").with_layer_count(16.0);
    let layer = base.shell_instance(5);

    assert_eq!(layer.layer_index, 5);
    assert_eq!(layer.layer_count, base.layer_count);
    assert_ne!(layer.id(), base.id());
    assert!(layer.name.ends_with("#5"));
}
