//! Fur render pass implementations.

mod gpu_fur;
mod shell_fur;

pub use gpu_fur::{GpuFurConfig, GpuFurPass};
pub use shell_fur::{
    ShellFurPass, SurfaceVertex, SURFACE_VERTEX_STRIDE, light_direction, sort_back_to_front,
};
