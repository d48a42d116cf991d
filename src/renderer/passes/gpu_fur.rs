//! GPU-driven procedural fur pass.
//!
//! One procedural multi-instance draw per frame: the skinned target's
//! deformed vertex stream and static fur attribute stream are bound as raw
//! storage buffers, the index buffer drives `vertex_index`, and the fur
//! shader expands one shell layer per GPU instance. No CPU-side vertex
//! data is submitted at all.
//!
//! # Data flow
//! ```text
//! SkinSource ──resolve──▶ BufferLease ──bind──▶ PropertyBlock + bind group
//! FurMaterial ──layers──▶ LayerInstanceSet ──▶ instance count + index array
//! TransformBinding ─────▶ world matrix        ──▶ DrawCall ──▶ draw_indexed
//! ```
//!
//! # Failure policy
//! - Configuration (named target / ancestor path unresolvable at
//!   [`initialize`](GpuFurPass::initialize)): fatal — the pass disables
//!   itself for the session and logs once.
//! - Per-frame resolution failure: transient — the frame's draw is
//!   skipped, cleanup still runs, next frame retries unconditionally.
//! - Zero layer count: a zero-instance draw is still issued so per-frame
//!   bookkeeping stays uniform.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::errors::{PeltError, Result};
use crate::renderer::fur::buffers::{LeaseLedger, ResolvedFurBuffers, resolve_fur_buffers};
use crate::renderer::fur::draw::{DrawCall, DrawPhase, ProceduralFurDraw};
use crate::renderer::fur::layers::LayerInstanceSet;
use crate::renderer::fur::transform::{TransformBinding, TransformMode};
use crate::renderer::fur::{PROP_LAYER_INDICES, SLOT_DEFORMED_VERTICES, SLOT_FUR_ATTRIBUTES};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::{PassEvent, RenderNode};
use crate::resources::buffer::BufferRef;
use crate::resources::material::{FurMaterial, PropertyBlock};
use crate::scene::Scene;
use crate::skinning::{SkinSource, VertexSemantic};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Configuration surface of the GPU-driven fur pass.
///
/// One pass instance serves one skinned target; variants of the technique
/// (which node places the draw, which stream carries fur data, which
/// submesh the draw targets) are configuration, not separate passes.
#[derive(Debug, Clone)]
pub struct GpuFurConfig {
    /// Name of the fur target node, looked up once at initialization.
    pub target: String,
    /// Vertex stream carrying the static per-vertex fur data.
    pub static_semantic: VertexSemantic,
    /// Which node's world matrix places the draw.
    pub transform: TransformMode,
    /// Material pass / mesh partition the draw targets.
    pub submesh_index: u32,
}

impl GpuFurConfig {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            static_semantic: VertexSemantic::TexCoord1,
            transform: TransformMode::OwnNode,
            submesh_index: 1,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: TransformMode) -> Self {
        self.transform = transform;
        self
    }
}

// ─── GPU-side layout ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FurUniforms {
    world: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
    layer_count: f32,
    shell_spacing: f32,
    shell_thickness: f32,
    _pad: f32,
}

struct FurPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
}

struct FrameDraw {
    bind_group: wgpu::BindGroup,
}

struct ResolvedTarget {
    transform: TransformBinding,
}

// ─── Pass ─────────────────────────────────────────────────────────────────────

/// The GPU-driven fur render pass.
pub struct GpuFurPass {
    config: GpuFurConfig,
    material: FurMaterial,
    skin: Arc<dyn SkinSource>,

    block: PropertyBlock,
    draw: ProceduralFurDraw,
    ledger: LeaseLedger,

    target: Option<ResolvedTarget>,
    disabled: bool,

    // Persistent GPU-facing buffers, rewritten per frame.
    layer_buffer: BufferRef,
    uniform_buffer: BufferRef,

    pipeline: Option<FurPipeline>,
    frame: Option<FrameDraw>,
}

impl GpuFurPass {
    #[must_use]
    pub fn new(config: GpuFurConfig, material: FurMaterial, skin: Arc<dyn SkinSource>) -> Self {
        let layer_buffer = BufferRef::new(
            &[0.0f32],
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            Some("FurLayerIndices"),
        );
        let uniform_buffer = BufferRef::new(
            &[FurUniforms::zeroed()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            Some("FurUniforms"),
        );
        Self {
            config,
            material,
            skin,
            block: PropertyBlock::new(),
            draw: ProceduralFurDraw::new(),
            ledger: LeaseLedger::new(),
            target: None,
            disabled: false,
            layer_buffer,
            uniform_buffer,
            pipeline: None,
            frame: None,
        }
    }

    /// Resolves the configured target and transform path against the
    /// scene. Must be called before the first frame.
    ///
    /// A failure here is fatal for the session: the pass disables itself,
    /// logs one diagnostic and never retries per frame.
    pub fn initialize(&mut self, scene: &Scene) -> Result<()> {
        match Self::resolve_target(&self.config, scene) {
            Ok(target) => {
                self.target = Some(target);
                self.disabled = false;
                Ok(())
            }
            Err(err) => {
                log::error!("GpuFurPass disabled for this session: {err}");
                self.target = None;
                self.disabled = true;
                self.block.clear();
                Err(err)
            }
        }
    }

    fn resolve_target(config: &GpuFurConfig, scene: &Scene) -> Result<ResolvedTarget> {
        let node = scene
            .find_node(&config.target)
            .ok_or_else(|| PeltError::TargetNotFound(config.target.clone()))?;
        let transform = TransformBinding::resolve(&config.transform, scene, node)?;
        Ok(ResolvedTarget { transform })
    }

    /// Builds the frame's immutable draw descriptor.
    #[must_use]
    pub fn build_draw_call(
        config: &GpuFurConfig,
        material: &FurMaterial,
        layers: &LayerInstanceSet,
        resolved: &ResolvedFurBuffers,
        world: Mat4,
    ) -> DrawCall {
        DrawCall {
            index_buffer: resolved.indices.id(),
            index_count: resolved.index_count,
            world,
            material: material.id(),
            submesh_index: config.submesh_index,
            topology: wgpu::PrimitiveTopology::TriangleList,
            instance_count: layers.instance_count(),
        }
    }

    fn build_pipeline(wgpu_ctx: &crate::renderer::context::WgpuContext) -> FurPipeline {
        let device = &wgpu_ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fur Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("fur.wgsl").into()),
        });

        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fur Bind Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
                storage_entry(3),
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fur Pipeline Layout"),
            bind_group_layouts: &[Some(&bind_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fur Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                // Procedural: no vertex buffers, the shader pulls from storage.
                buffers: &[],
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
                depth_write_enabled: Some(true),
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

        FurPipeline {
            pipeline,
            bind_layout,
        }
    }

    // ── Test-facing accessors ──────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[inline]
    #[must_use]
    pub fn draw_phase(&self) -> DrawPhase {
        self.draw.phase()
    }

    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &LeaseLedger {
        &self.ledger
    }

    #[inline]
    #[must_use]
    pub fn property_block(&self) -> &PropertyBlock {
        &self.block
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> &FurMaterial {
        &self.material
    }

    #[inline]
    pub fn material_mut(&mut self) -> &mut FurMaterial {
        &mut self.material
    }
}

impl RenderNode for GpuFurPass {
    fn name(&self) -> &str {
        "GPU Fur Pass"
    }

    fn event(&self) -> PassEvent {
        PassEvent::BeforeTransparents
    }

    fn setup(&mut self, ctx: &mut PrepareContext) {
        if self.disabled {
            return;
        }
        let Some(target) = &self.target else {
            // initialize() was never called; nothing to draw.
            return;
        };

        // Fresh resolution every frame; the deformed handle must never be
        // cached across frames.
        let (lease, resolved) = resolve_fur_buffers(
            self.skin.as_ref(),
            self.config.static_semantic,
            &self.ledger,
        );
        if !self.draw.configure(lease, resolved) {
            return;
        }
        let Some(world) = target.transform.world_matrix(ctx.scene) else {
            return;
        };
        let Some(resolved) = self.draw.resolved().cloned() else {
            return;
        };

        let layers = LayerInstanceSet::from_material(&self.material);

        // Per-object property block, never the shared material.
        self.block
            .set_buffer(SLOT_DEFORMED_VERTICES, resolved.deformed.clone());
        self.block
            .set_buffer(SLOT_FUR_ATTRIBUTES, resolved.attributes.clone());
        self.block
            .set_float_array(PROP_LAYER_INDICES, layers.indices().to_vec());

        // Upload frame data. A zero-layer frame keeps one sentinel entry in
        // the layer buffer: empty bindings are invalid, and the draw's zero
        // instance range never reads it.
        if layers.is_empty() {
            self.layer_buffer.update(&[0.0f32]);
        } else {
            self.layer_buffer.update(layers.indices());
        }
        self.uniform_buffer.update(&[FurUniforms {
            world: world.to_cols_array_2d(),
            view_proj: ctx.camera.view_proj.to_cols_array_2d(),
            layer_count: layers.instance_count() as f32,
            shell_spacing: self.material.shell_spacing,
            shell_thickness: self.material.shell_thickness,
            _pad: 0.0,
        }]);

        let uniform_id = ctx.resources.upload(&self.uniform_buffer);
        let deformed_id = ctx.resources.upload(&resolved.deformed);
        let attributes_id = ctx.resources.upload(&resolved.attributes);
        let layer_id = ctx.resources.upload(&self.layer_buffer);
        let _index_id = ctx.resources.upload(&resolved.indices);

        let pipeline = self
            .pipeline
            .get_or_insert_with(|| Self::build_pipeline(ctx.wgpu));

        let resources = &*ctx.resources;
        let (Some(uniforms), Some(deformed), Some(attributes), Some(layer_indices)) = (
            resources.get(uniform_id),
            resources.get(deformed_id),
            resources.get(attributes_id),
            resources.get(layer_id),
        ) else {
            return;
        };
        let bind_group = ctx
            .wgpu
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Fur Bind Group"),
                layout: &pipeline.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms.buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: deformed.buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: attributes.buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: layer_indices.buffer.as_entire_binding(),
                    },
                ],
            });

        let call = Self::build_draw_call(&self.config, &self.material, &layers, &resolved, world);
        self.draw.bind(call);
        self.frame = Some(FrameDraw { bind_group });
    }

    fn execute(&mut self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        // Nothing bound this frame (failed resolution, disabled, or
        // missing world): no render pass, no draw call recorded.
        if self.draw.phase() != DrawPhase::Bound {
            return;
        }
        let (Some(pipeline), Some(frame)) = (&self.pipeline, &self.frame) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GPU Fur Pass"),
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
        pass.set_bind_group(0, &frame.bind_group, &[]);

        // Exactly one procedural draw; instance count may be zero and the
        // call is still issued.
        self.draw.submit_with(|call, _resolved| {
            if let Some(index) = ctx.resources.get(call.index_buffer) {
                pass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..call.index_count, 0, 0..call.instance_count);
            } else {
                log::error!("fur index buffer missing from resource manager at execute");
            }
        });
    }

    fn cleanup(&mut self) {
        // Unconditional: no per-frame buffer handle outlives its frame.
        self.draw.finish_frame();
        self.frame = None;
    }
}
