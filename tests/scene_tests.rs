//! Scene graph and transform path tests
//!
//! Tests for:
//! - Transform dirty checking and TRS → matrix conversion
//! - Hierarchical world-matrix propagation
//! - Name lookup (configuration-time only)
//! - Fixed transform path parsing and resolution
//! - Transform binding modes (own node vs. named ancestor)

use glam::{Mat4, Quat, Vec3};
use pelt::scene::{Node, Scene};
use pelt::{PathStep, PeltError, TransformBinding, TransformMode, TransformPath};
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn translation_of(mat: Mat4) -> Vec3 {
    mat.w_axis.truncate()
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let node = Node::new("n");
    assert_eq!(node.transform.position, Vec3::ZERO);
    assert_eq!(node.transform.rotation, Quat::IDENTITY);
    assert_eq!(node.transform.scale, Vec3::ONE);
}

#[test]
fn transform_dirty_check_skips_unchanged() {
    let mut node = Node::new("n");

    // First update always recomputes.
    assert!(node.transform.update_local_matrix());
    assert!(!node.transform.update_local_matrix());

    node.transform.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(node.transform.update_local_matrix());
    assert!(!node.transform.update_local_matrix());

    node.transform.mark_dirty();
    assert!(node.transform.update_local_matrix());
}

// ============================================================================
// World-matrix propagation
// ============================================================================

#[test]
fn world_matrices_compose_down_the_hierarchy() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_child(parent, Node::new("child"));

    scene.node_mut(parent).unwrap().transform.position = Vec3::new(1.0, 2.0, 3.0);
    scene.node_mut(child).unwrap().transform.position = Vec3::new(10.0, 0.0, 0.0);
    scene.update_world_matrices();

    let world = scene
        .node(child)
        .unwrap()
        .transform
        .world_matrix_as_mat4();
    assert!(vec3_approx(
        translation_of(world),
        Vec3::new(11.0, 2.0, 3.0)
    ));
}

#[test]
fn reparenting_changes_world_matrix() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let b = scene.add_node(Node::new("b"));
    let child = scene.add_child(a, Node::new("child"));

    scene.node_mut(a).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);
    scene.node_mut(b).unwrap().transform.position = Vec3::new(0.0, 7.0, 0.0);
    scene.update_world_matrices();

    scene.attach(b, child);
    scene.update_world_matrices();

    let world = scene
        .node(child)
        .unwrap()
        .transform
        .world_matrix_as_mat4();
    assert!(vec3_approx(translation_of(world), Vec3::new(0.0, 7.0, 0.0)));
    assert_eq!(scene.node(child).unwrap().parent(), Some(b));
    assert!(!scene.node(a).unwrap().children().contains(&child));
}

#[test]
fn rotation_propagates_to_children() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_child(parent, Node::new("child"));

    scene.node_mut(parent).unwrap().transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
    scene.node_mut(child).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
    scene.update_world_matrices();

    let world = scene
        .node(child)
        .unwrap()
        .transform
        .world_matrix_as_mat4();
    // +X rotated a quarter turn around Y lands on -Z.
    assert!(vec3_approx(
        translation_of(world),
        Vec3::new(0.0, 0.0, -1.0)
    ));
}

// ============================================================================
// Name lookup
// ============================================================================

#[test]
fn find_node_and_child_by_name() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let armature = scene.add_child(root, Node::new("Armature"));
    let bone = scene.add_child(armature, Node::new("spine"));

    assert_eq!(scene.find_node("Armature"), Some(armature));
    assert_eq!(scene.find_node("missing"), None);
    assert_eq!(scene.child_by_name(root, "Armature"), Some(armature));
    assert_eq!(scene.child_by_name(armature, "spine"), Some(bone));
    assert_eq!(scene.child_by_name(root, "spine"), None);
}

// ============================================================================
// Transform paths
// ============================================================================

#[test]
fn path_parse_mixes_parent_and_child_steps() {
    let path = TransformPath::parse("../Armature/root");
    assert_eq!(
        path.steps(),
        &[
            PathStep::Parent,
            PathStep::Child("Armature".to_string()),
            PathStep::Child("root".to_string()),
        ]
    );
}

#[test]
fn path_parse_ignores_empty_segments() {
    let path = TransformPath::parse("//Armature//root/");
    assert_eq!(path.steps().len(), 2);
    assert!(TransformPath::parse("").is_empty());
}

#[test]
fn path_resolves_across_hierarchies() {
    // renderer and skeleton are siblings under the same rig root, the
    // usual layout when fur geometry follows a detached skeleton.
    let mut scene = Scene::new();
    let rig = scene.add_node(Node::new("rig"));
    let renderer = scene.add_child(rig, Node::new("FurRenderer"));
    let armature = scene.add_child(rig, Node::new("Armature"));
    let root_bone = scene.add_child(armature, Node::new("root"));

    let path = TransformPath::parse("../Armature/root");
    assert_eq!(path.resolve(&scene, renderer).unwrap(), root_bone);
}

#[test]
fn path_missing_child_is_a_config_error() {
    let mut scene = Scene::new();
    let rig = scene.add_node(Node::new("rig"));
    let renderer = scene.add_child(rig, Node::new("FurRenderer"));

    let path = TransformPath::parse("../Armature/root");
    let err = path.resolve(&scene, renderer).unwrap_err();
    match err {
        PeltError::PathStepNotFound { start, step } => {
            assert_eq!(start, "FurRenderer");
            assert_eq!(step, "Armature");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn path_parent_of_root_is_a_config_error() {
    let mut scene = Scene::new();
    let lone = scene.add_node(Node::new("lone"));

    let err = TransformPath::new()
        .parent()
        .resolve(&scene, lone)
        .unwrap_err();
    assert!(matches!(
        err,
        PeltError::PathStepNotFound { ref step, .. } if step == ".."
    ));
}

// ============================================================================
// Transform bindings
// ============================================================================

#[test]
fn own_node_binding_uses_target_matrix() {
    let mut scene = Scene::new();
    let target = scene.add_node(Node::new("target"));
    scene.node_mut(target).unwrap().transform.position = Vec3::new(3.0, 0.0, 0.0);
    scene.update_world_matrices();

    let binding = TransformBinding::resolve(&TransformMode::OwnNode, &scene, target).unwrap();
    assert_eq!(binding.node(), target);
    let world = binding.world_matrix(&scene).unwrap();
    assert!(vec3_approx(translation_of(world), Vec3::new(3.0, 0.0, 0.0)));
}

#[test]
fn ancestor_binding_follows_the_skeleton_root() {
    let mut scene = Scene::new();
    let rig = scene.add_node(Node::new("rig"));
    let renderer = scene.add_child(rig, Node::new("FurRenderer"));
    let armature = scene.add_child(rig, Node::new("Armature"));
    let root_bone = scene.add_child(armature, Node::new("root"));

    // The skeleton root drifts away from the renderer node.
    scene.node_mut(root_bone).unwrap().transform.position = Vec3::new(0.0, 4.0, 0.0);
    scene.node_mut(renderer).unwrap().transform.position = Vec3::new(9.0, 0.0, 0.0);
    scene.update_world_matrices();

    let mode = TransformMode::Ancestor(TransformPath::parse("../Armature/root"));
    let binding = TransformBinding::resolve(&mode, &scene, renderer).unwrap();
    assert_eq!(binding.node(), root_bone);

    let world = binding.world_matrix(&scene).unwrap();
    assert!(vec3_approx(translation_of(world), Vec3::new(0.0, 4.0, 0.0)));
}
