#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod skinning;

pub use errors::{PeltError, Result};
pub use renderer::context::WgpuContext;
pub use renderer::fur::buffers::{BufferLease, LeaseLedger, ResolvedFurBuffers};
pub use renderer::fur::draw::{DrawCall, DrawPhase, ProceduralFurDraw};
pub use renderer::fur::layers::LayerInstanceSet;
pub use renderer::fur::transform::{TransformBinding, TransformMode};
pub use renderer::graph::{
    CameraState, ExecuteContext, FrameTargets, PassEvent, PrepareContext, RenderGraph, RenderNode,
};
pub use renderer::passes::{GpuFurConfig, GpuFurPass, ShellFurPass};
pub use renderer::resources::ResourceManager;
pub use resources::buffer::BufferRef;
pub use resources::material::{FurMaterial, PropertyBlock};
pub use scene::path::{PathStep, TransformPath};
pub use scene::{FurSurface, Node, NodeHandle, RenderLayers, Scene};
pub use skinning::{SkinSource, SkinnedMeshBuffers, VertexSemantic};
