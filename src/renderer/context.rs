//! WGPU core context.
//!
//! The host pipeline owns adapter/device creation, surface management and
//! swap-chain configuration; the fur passes only need the handles below
//! plus the target formats their pipelines must be compatible with.

/// Device, queue and target-format description handed in by the host.
#[derive(Debug)]
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    /// Format of the color target the fur passes draw into.
    pub color_format: wgpu::TextureFormat,
    /// Format of the depth target, if the host binds one.
    pub depth_format: Option<wgpu::TextureFormat>,
    /// MSAA sample count of the targets (1 = no MSAA).
    pub sample_count: u32,
}

impl WgpuContext {
    #[must_use]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        sample_count: u32,
    ) -> Self {
        Self {
            device,
            queue,
            color_format,
            depth_format,
            sample_count,
        }
    }
}
