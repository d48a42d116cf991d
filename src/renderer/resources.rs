//! GPU resource mirroring.
//!
//! [`ResourceManager`] keeps one `wgpu::Buffer` per live [`BufferRef`] id,
//! uploading lazily: a buffer is (re)written only when the handle's
//! version counter runs ahead of the last uploaded version. Growth beyond
//! the allocated size destroys and recreates the GPU buffer; shrinking
//! reuses the existing allocation.
//!
//! Entries are stamped with the frame they were last used in so stale
//! mirrors (e.g. deformed buffers the skinning system reallocated, whose
//! old ids will never be requested again) can be reclaimed.

use rustc_hash::FxHashMap;

use crate::resources::buffer::BufferRef;

/// GPU-side mirror of one [`BufferRef`].
#[derive(Debug)]
pub struct GpuBuffer {
    pub buffer: wgpu::Buffer,
    pub size: u64,
    last_uploaded_version: u64,
    last_used_frame: u64,
}

impl GpuBuffer {
    fn new(device: &wgpu::Device, data: &[u8], usage: wgpu::BufferUsages, label: &str) -> Self {
        use wgpu::util::DeviceExt;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage,
        });
        Self {
            buffer,
            size: data.len() as u64,
            last_uploaded_version: 0,
            last_used_frame: 0,
        }
    }
}

/// Maps [`BufferRef`] ids to GPU buffers, with version-gated uploads.
#[derive(Debug)]
pub struct ResourceManager {
    device: wgpu::Device,
    queue: wgpu::Queue,
    gpu_buffers: FxHashMap<u64, GpuBuffer>,
    frame_index: u64,
}

impl ResourceManager {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            gpu_buffers: FxHashMap::default(),
            frame_index: 0,
        }
    }

    /// Marks the start of a frame; used for last-used stamping.
    pub fn begin_frame(&mut self, frame_index: u64) {
        self.frame_index = frame_index;
    }

    /// Ensures the GPU mirror of `buffer_ref` exists and is current,
    /// returning its id for a later [`get`](Self::get).
    pub fn upload(&mut self, buffer_ref: &BufferRef) -> u64 {
        let id = buffer_ref.id();
        let data = buffer_ref.read_data();

        let gpu_buf = self.gpu_buffers.entry(id).or_insert_with(|| {
            let mut buf = GpuBuffer::new(&self.device, &data, buffer_ref.usage(), buffer_ref.label());
            buf.last_uploaded_version = buffer_ref.version();
            buf
        });

        if buffer_ref.version() > gpu_buf.last_uploaded_version {
            if data.len() as u64 > gpu_buf.size {
                log::debug!(
                    "resizing buffer {:?} from {} to {} bytes",
                    buffer_ref.label(),
                    gpu_buf.size,
                    data.len()
                );
                *gpu_buf = GpuBuffer::new(&self.device, &data, buffer_ref.usage(), buffer_ref.label());
            } else {
                self.queue.write_buffer(&gpu_buf.buffer, 0, &data);
            }
            gpu_buf.last_uploaded_version = buffer_ref.version();
        }

        gpu_buf.last_used_frame = self.frame_index;
        id
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&GpuBuffer> {
        self.gpu_buffers.get(&id)
    }

    /// Drops mirrors not used for `max_age` frames.
    pub fn release_unused(&mut self, max_age: u64) {
        let cutoff = self.frame_index.saturating_sub(max_age);
        self.gpu_buffers
            .retain(|_, buf| buf.last_used_frame >= cutoff);
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.gpu_buffers.len()
    }
}
