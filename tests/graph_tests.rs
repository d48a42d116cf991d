//! Render graph sequencing tests
//!
//! Tests for:
//! - Node ordering by injection event (stable within an event)
//! - Fur surface registration and layer filtering

use pelt::scene::{FurSurface, Node, RenderLayers, Scene};
use pelt::{BufferRef, PassEvent, RenderGraph, RenderNode};

// ============================================================================
// Helpers
// ============================================================================

struct NullPass {
    name: &'static str,
    event: PassEvent,
}

impl NullPass {
    fn boxed(name: &'static str, event: PassEvent) -> Box<dyn RenderNode> {
        Box::new(Self { name, event })
    }
}

impl RenderNode for NullPass {
    fn name(&self) -> &str {
        self.name
    }

    fn event(&self) -> PassEvent {
        self.event
    }
}

// ============================================================================
// Node ordering
// ============================================================================

#[test]
fn nodes_are_ordered_by_event() {
    let mut graph = RenderGraph::new();
    graph.add_node(NullPass::boxed("post", PassEvent::AfterTransparents));
    graph.add_node(NullPass::boxed("pre", PassEvent::BeforeOpaques));
    graph.add_node(NullPass::boxed("fur", PassEvent::BeforeTransparents));

    let order: Vec<&str> = graph.node_names().collect();
    assert_eq!(order, vec!["pre", "fur", "post"]);
}

#[test]
fn same_event_keeps_insertion_order() {
    let mut graph = RenderGraph::new();
    graph.add_node(NullPass::boxed("shell", PassEvent::BeforeTransparents));
    graph.add_node(NullPass::boxed("gpu", PassEvent::BeforeTransparents));

    let order: Vec<&str> = graph.node_names().collect();
    assert_eq!(order, vec!["shell", "gpu"]);
    assert_eq!(graph.node_count(), 2);
}

// ============================================================================
// Fur surfaces
// ============================================================================

#[test]
fn surfaces_filter_by_render_layer() {
    let mut scene = Scene::new();
    let furred = scene.add_node(Node::new("furred").with_layers(RenderLayers::FUR));
    let plain = scene.add_node(Node::new("plain"));

    let vertices = BufferRef::new(&[0.0f32; 8], wgpu::BufferUsages::VERTEX, None);
    scene.add_surface(FurSurface {
        node: furred,
        vertex_buffer: vertices.clone(),
        vertex_count: 3,
        index_buffer: None,
        layers: RenderLayers::FUR,
    });
    scene.add_surface(FurSurface {
        node: plain,
        vertex_buffer: vertices,
        vertex_count: 3,
        index_buffer: None,
        layers: RenderLayers::DEFAULT,
    });

    let fur_count = scene
        .surfaces()
        .filter(|(_, s)| s.layers.contains(RenderLayers::FUR))
        .count();
    assert_eq!(fur_count, 1);
}
