//! Shell-multiplied fur pass.
//!
//! The simpler, draw-call-heavy technique: every fur-tagged surface is
//! submitted once per shell layer with a per-layer material instance, so a
//! 16-layer setup costs 16× the scene's fur geometry in draw submissions
//! per frame — against the GPU-driven technique's single procedural draw.
//!
//! Two deliberate departures from the naive form of the technique:
//!
//! - Layer material instances are **pooled**: allocated once at
//!   initialization and reused across frames, with only the mutated
//!   light-direction property rewritten per frame.
//! - The directional light is an **explicit dependency** resolved once at
//!   initialization, not a per-frame global scene query. A scene without
//!   one is valid: the light binding is omitted and fur renders unlit.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::{PassEvent, RenderNode};
use crate::resources::buffer::BufferRef;
use crate::resources::material::FurMaterial;
use crate::scene::{NodeHandle, RenderLayers, Scene, SurfaceKey};

// ─── Vertex layout contract ───────────────────────────────────────────────────

/// Layout of one shell-fur surface vertex (32 bytes). The pipeline's
/// vertex attributes assume exactly this — keep in lockstep.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Byte stride of [`SurfaceVertex`].
pub const SURFACE_VERTEX_STRIDE: usize = size_of::<SurfaceVertex>();

// ─── GPU-side layout ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ShellUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    layer: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniforms {
    world: [[f32; 4]; 4],
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Direction toward the light a directional light node shines along:
/// the node's forward axis (-Z), negated, in world space.
#[must_use]
pub fn light_direction(scene: &Scene, node: NodeHandle) -> Option<Vec3> {
    let world = scene.node(node)?.transform.world_matrix();
    let toward = Vec3::from(world.matrix3.z_axis);
    let len = toward.length();
    if len < 1e-6 {
        return None;
    }
    Some(toward / len)
}

/// Sorts draw entries back-to-front (common-transparent ordering):
/// greatest view depth first.
pub fn sort_back_to_front<T>(items: &mut [(T, f32)]) {
    items.sort_by(|a, b| b.1.total_cmp(&a.1));
}

// ─── Pass ─────────────────────────────────────────────────────────────────────

struct ShellLayer {
    material: FurMaterial,
    uniforms: BufferRef,
}

struct ShellPipeline {
    pipeline: wgpu::RenderPipeline,
    layer_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
}

struct ShellDraw {
    vertex_buffer: u64,
    vertex_count: u32,
    index: Option<(u64, u32)>,
    object_bind_group: wgpu::BindGroup,
}

struct ShellFrame {
    layer_bind_groups: Vec<wgpu::BindGroup>,
    draws: Vec<ShellDraw>,
}

/// The shell-multiplied fur render pass.
pub struct ShellFurPass {
    base: FurMaterial,
    layer_count: u32,

    pool: Vec<ShellLayer>,
    light_node: Option<NodeHandle>,
    initialized: bool,

    // Per-surface world-matrix uniforms, pooled across frames.
    world_uniforms: FxHashMap<SurfaceKey, BufferRef>,

    pipeline: Option<ShellPipeline>,
    frame: Option<ShellFrame>,
}

impl ShellFurPass {
    #[must_use]
    pub fn new(base: FurMaterial, layer_count: u32) -> Self {
        Self {
            base,
            layer_count,
            pool: Vec::new(),
            light_node: None,
            initialized: false,
            world_uniforms: FxHashMap::default(),
            pipeline: None,
            frame: None,
        }
    }

    /// Resolves the pass's scene dependencies and builds the layer pool.
    ///
    /// The directional light is optional: without one the light binding
    /// is omitted for the session (logged once), never crashed on.
    pub fn initialize(&mut self, scene: &Scene) {
        self.light_node = scene.first_directional_light().map(|(node, _)| node);
        if self.light_node.is_none() {
            log::warn!("ShellFurPass: no directional light in scene, fur renders unlit");
        }

        if self.pool.len() != self.layer_count as usize {
            self.pool = (0..self.layer_count)
                .map(|i| ShellLayer {
                    material: self.base.shell_instance(i),
                    uniforms: BufferRef::new(
                        &[ShellUniforms::zeroed()],
                        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        Some("ShellLayerUniforms"),
                    ),
                })
                .collect();
        }
        self.initialized = true;
    }

    /// Rewrites the per-frame light direction on every pooled layer
    /// material — the only property that mutates between frames.
    pub fn refresh_light(&mut self, scene: &Scene) {
        let dir = self.light_node.and_then(|node| light_direction(scene, node));
        for layer in &mut self.pool {
            layer.material.light_dir = dir;
        }
    }

    fn build_pipeline(wgpu_ctx: &crate::renderer::context::WgpuContext) -> ShellPipeline {
        let device = &wgpu_ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shell Fur Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shell.wgsl").into()),
        });

        let uniform_layout = |label: &str| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            })
        };
        let layer_layout = uniform_layout("Shell Layer Layout");
        let object_layout = uniform_layout("Shell Object Layout");

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shell Fur Pipeline Layout"),
            bind_group_layouts: &[Some(&layer_layout), Some(&object_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shell Fur Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: SURFACE_VERTEX_STRIDE as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu_ctx.color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: wgpu_ctx.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                // Transparent-style ordering handles overlap; keep depth
                // reads so fur sits behind opaque geometry.
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: wgpu_ctx.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        ShellPipeline {
            pipeline,
            layer_layout,
            object_layout,
        }
    }

    // ── Test-facing accessors ──────────────────────────────────────────────

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn layer_materials(&self) -> impl Iterator<Item = &FurMaterial> {
        self.pool.iter().map(|layer| &layer.material)
    }

    #[inline]
    #[must_use]
    pub fn resolved_light(&self) -> Option<NodeHandle> {
        self.light_node
    }
}

impl RenderNode for ShellFurPass {
    fn name(&self) -> &str {
        "Shell Fur Pass"
    }

    fn event(&self) -> PassEvent {
        PassEvent::BeforeTransparents
    }

    fn setup(&mut self, ctx: &mut PrepareContext) {
        if !self.initialized || self.pool.is_empty() {
            return;
        }

        self.refresh_light(ctx.scene);
        let light_dir = self
            .pool
            .first()
            .and_then(|layer| layer.material.light_dir);

        // Gather fur-tagged surfaces and order them back-to-front.
        let mut ordered: Vec<(SurfaceKey, f32)> = ctx
            .scene
            .surfaces()
            .filter(|(_, surface)| surface.layers.contains(RenderLayers::FUR))
            .filter_map(|(key, surface)| {
                let node = ctx.scene.node(surface.node)?;
                let position = Vec3::from(node.transform.world_matrix().translation);
                Some((key, (position - ctx.camera.eye).length()))
            })
            .collect();
        sort_back_to_front(&mut ordered);

        // Drop world-uniform pool entries for surfaces that disappeared.
        self.world_uniforms
            .retain(|key, _| ctx.scene.surface(*key).is_some());

        let pipeline = self
            .pipeline
            .get_or_insert_with(|| Self::build_pipeline(ctx.wgpu));

        // Per-layer uniforms: only light direction and view state change
        // between frames; the pooled buffers are rewritten in place.
        let light = light_dir.map_or([0.0; 4], |d| [d.x, d.y, d.z, 1.0]);
        let mut layer_bind_groups = Vec::with_capacity(self.pool.len());
        for layer in &self.pool {
            layer.uniforms.update(&[ShellUniforms {
                view_proj: ctx.camera.view_proj.to_cols_array_2d(),
                light_dir: light,
                layer: [
                    layer.material.layer_index as f32,
                    self.layer_count as f32,
                    layer.material.shell_spacing,
                    layer.material.shell_thickness,
                ],
            }]);
            let id = ctx.resources.upload(&layer.uniforms);
            let Some(gpu) = ctx.resources.get(id) else {
                continue;
            };
            layer_bind_groups.push(ctx.wgpu.device.create_bind_group(
                &wgpu::BindGroupDescriptor {
                    label: Some("Shell Layer Bind Group"),
                    layout: &pipeline.layer_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: gpu.buffer.as_entire_binding(),
                    }],
                },
            ));
        }

        let mut draws = Vec::with_capacity(ordered.len());
        for (key, _) in ordered {
            let Some(surface) = ctx.scene.surface(key) else {
                continue;
            };
            let Some(node) = ctx.scene.node(surface.node) else {
                continue;
            };

            let world = self.world_uniforms.entry(key).or_insert_with(|| {
                BufferRef::new(
                    &[ObjectUniforms::zeroed()],
                    wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    Some("ShellObjectUniforms"),
                )
            });
            world.update(&[ObjectUniforms {
                world: node.transform.world_matrix_as_mat4().to_cols_array_2d(),
            }]);
            let world_id = ctx.resources.upload(world);

            let vertex_id = ctx.resources.upload(&surface.vertex_buffer);
            let index = surface
                .index_buffer
                .as_ref()
                .map(|(buffer, count)| (ctx.resources.upload(buffer), *count));

            let Some(world_gpu) = ctx.resources.get(world_id) else {
                continue;
            };
            let object_bind_group =
                ctx.wgpu
                    .device
                    .create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Shell Object Bind Group"),
                        layout: &pipeline.object_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: world_gpu.buffer.as_entire_binding(),
                        }],
                    });

            draws.push(ShellDraw {
                vertex_buffer: vertex_id,
                vertex_count: surface.vertex_count,
                index,
                object_bind_group,
            });
        }

        self.frame = Some(ShellFrame {
            layer_bind_groups,
            draws,
        });
    }

    fn execute(&mut self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(pipeline), Some(frame)) = (&self.pipeline, &self.frame) else {
            return;
        };
        if frame.draws.is_empty() {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shell Fur Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: ctx.targets.depth_view.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&pipeline.pipeline);

        // Innermost-first layer order; each layer re-draws every surface.
        for layer_bind_group in &frame.layer_bind_groups {
            pass.set_bind_group(0, layer_bind_group, &[]);
            for draw in &frame.draws {
                let Some(vertex) = ctx.resources.get(draw.vertex_buffer) else {
                    continue;
                };
                pass.set_bind_group(1, &draw.object_bind_group, &[]);
                pass.set_vertex_buffer(0, vertex.buffer.slice(..));
                match draw.index {
                    Some((index_id, index_count)) => {
                        let Some(index) = ctx.resources.get(index_id) else {
                            continue;
                        };
                        pass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..index_count, 0, 0..1);
                    }
                    None => pass.draw(0..draw.vertex_count, 0..1),
                }
            }
        }
    }

    fn cleanup(&mut self) {
        self.frame = None;
    }
}
