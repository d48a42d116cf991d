//! Shell fur pass tests
//!
//! Tests for:
//! - Layer material pooling (built once, reused across frames)
//! - Directional light resolution at initialization and the no-light guard
//! - Light direction derivation from the light node's orientation
//! - Common-transparent (back-to-front) draw ordering

use glam::Vec3;
use pelt::renderer::passes::{light_direction, sort_back_to_front};
use pelt::scene::light::Light;
use pelt::scene::{Node, Scene};
use pelt::{FurMaterial, ShellFurPass};
use std::f32::consts::PI;

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn base_material() -> FurMaterial {
    FurMaterial::new("shell fur")
        .with_layer_count(4.0)
        .with_shell_spacing(0.02)
        .with_shell_thickness(0.8)
}

// ============================================================================
// Layer material pool
// ============================================================================

#[test]
fn pool_is_built_once_with_layer_count_instances() {
    let scene = Scene::new();
    let mut pass = ShellFurPass::new(base_material(), 8);
    assert_eq!(pass.pool_len(), 0);

    pass.initialize(&scene);
    assert_eq!(pass.pool_len(), 8);

    let indices: Vec<u32> = pass.layer_materials().map(|m| m.layer_index).collect();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
}

#[test]
fn pool_instances_copy_base_properties_with_fresh_identity() {
    let base = base_material();
    let scene = Scene::new();
    let mut pass = ShellFurPass::new(base.clone(), 3);
    pass.initialize(&scene);

    for material in pass.layer_materials() {
        assert_eq!(material.shell_spacing, base.shell_spacing);
        assert_eq!(material.shell_thickness, base.shell_thickness);
        assert_eq!(material.layer_count, base.layer_count);
        assert_ne!(material.id(), base.id());
    }
}

#[test]
fn reinitialize_reuses_the_pool() {
    let scene = Scene::new();
    let mut pass = ShellFurPass::new(base_material(), 4);
    pass.initialize(&scene);
    let first: Vec<_> = pass.layer_materials().map(FurMaterial::id).collect();

    // Same layer count: no reallocation, the pooled instances survive.
    pass.initialize(&scene);
    let second: Vec<_> = pass.layer_materials().map(FurMaterial::id).collect();
    assert_eq!(first, second);
}

// ============================================================================
// Directional light resolution
// ============================================================================

fn scene_with_directional() -> (Scene, pelt::NodeHandle) {
    let mut scene = Scene::new();
    let sun = scene.add_node(Node::new("sun"));
    scene.add_light(sun, Light::new_directional(Vec3::ONE, 2.0));
    scene.update_world_matrices();
    (scene, sun)
}

#[test]
fn initialize_resolves_first_directional_light() {
    let (scene, sun) = scene_with_directional();
    let mut pass = ShellFurPass::new(base_material(), 4);
    pass.initialize(&scene);
    assert_eq!(pass.resolved_light(), Some(sun));
}

#[test]
fn point_lights_are_not_resolved() {
    let mut scene = Scene::new();
    let lamp = scene.add_node(Node::new("lamp"));
    scene.add_light(lamp, Light::new_point(Vec3::ONE, 5.0));

    let mut pass = ShellFurPass::new(base_material(), 4);
    pass.initialize(&scene);
    assert_eq!(pass.resolved_light(), None);
}

#[test]
fn refresh_light_updates_every_pooled_material() {
    let (scene, _) = scene_with_directional();
    let mut pass = ShellFurPass::new(base_material(), 4);
    pass.initialize(&scene);
    pass.refresh_light(&scene);

    for material in pass.layer_materials() {
        let dir = material.light_dir.expect("light direction should be set");
        // Identity orientation: forward is -Z, toward-light is +Z.
        assert!((dir - Vec3::Z).length() < EPSILON);
    }
}

#[test]
fn missing_light_leaves_direction_unset() {
    // The guard: no directional light in the scene must never crash the
    // pass; the binding is simply omitted.
    let scene = Scene::new();
    let mut pass = ShellFurPass::new(base_material(), 4);
    pass.initialize(&scene);
    pass.refresh_light(&scene);

    for material in pass.layer_materials() {
        assert!(material.light_dir.is_none());
    }
}

#[test]
fn light_direction_follows_node_orientation() {
    let mut scene = Scene::new();
    let sun = scene.add_node(Node::new("sun"));
    // Face the light straight down: toward-light becomes +Y.
    scene
        .node_mut(sun)
        .unwrap()
        .transform
        .look_at(Vec3::new(0.0, -1.0, 0.0), Vec3::Z);
    scene.update_world_matrices();

    let dir = light_direction(&scene, sun).unwrap();
    assert!((dir - Vec3::Y).length() < 1e-4);
}

#[test]
fn light_direction_half_turn_flips_sign() {
    let mut scene = Scene::new();
    let sun = scene.add_node(Node::new("sun"));
    scene.node_mut(sun).unwrap().transform.rotation = glam::Quat::from_rotation_y(PI);
    scene.update_world_matrices();

    let dir = light_direction(&scene, sun).unwrap();
    assert!((dir - Vec3::NEG_Z).length() < 1e-4);
}

// ============================================================================
// Draw ordering
// ============================================================================

#[test]
fn sort_is_back_to_front() {
    let mut items = vec![("near", 1.0f32), ("far", 9.0), ("mid", 4.0)];
    sort_back_to_front(&mut items);
    let order: Vec<&str> = items.into_iter().map(|(name, _)| name).collect();
    assert_eq!(order, vec!["far", "mid", "near"]);
}

#[test]
fn sort_keeps_equal_depths_adjacent() {
    let mut items = vec![(1, 2.0f32), (2, 5.0), (3, 2.0), (4, 7.0)];
    sort_back_to_front(&mut items);
    assert_eq!(items[0].0, 4);
    assert_eq!(items[1].0, 2);
    let tail: Vec<i32> = items[2..].iter().map(|(v, _)| *v).collect();
    assert!(tail.contains(&1) && tail.contains(&3));
}
