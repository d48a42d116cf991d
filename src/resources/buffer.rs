//! CPU-side buffer descriptors.
//!
//! [`BufferRef`] is the unit of exchange between the skinning producer and
//! the fur passes: a cheaply clonable, reference-counted descriptor of a
//! GPU-resident buffer. The CPU payload is the authoritative copy; the
//! [`ResourceManager`](crate::renderer::resources::ResourceManager) mirrors
//! it to a `wgpu::Buffer` lazily, gated on the version counter.
//!
//! Identity is the numeric `id`, not the payload: two `BufferRef` clones
//! compare equal, a rebuilt buffer (e.g. after the skinning system
//! reallocates its vertex storage) gets a fresh id and is therefore a
//! different handle. This is what lets the fur buffer resolver detect
//! reallocation simply by re-resolving every frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bytemuck::Pod;

// Global buffer id generator. Ids start at 1 so 0 can act as "no buffer"
// in packed GPU-side tables.
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct DataBuffer {
    id: u64,
    label: String,
    usage: wgpu::BufferUsages,
    version: AtomicU64,
    data: RwLock<Vec<u8>>,
}

/// Shared handle to a CPU-side buffer.
#[derive(Debug, Clone)]
pub struct BufferRef(Arc<DataBuffer>);

impl PartialEq for BufferRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for BufferRef {}

impl std::hash::Hash for BufferRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl BufferRef {
    /// Creates a buffer from a typed slice.
    pub fn new<T: Pod>(data: &[T], usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self::from_bytes(bytemuck::cast_slice(data), usage, label)
    }

    /// Creates a buffer from raw bytes.
    pub fn from_bytes(data: &[u8], usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self(Arc::new(DataBuffer {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.unwrap_or("Buffer").to_string(),
            usage,
            version: AtomicU64::new(0),
            data: RwLock::new(data.to_vec()),
        }))
    }

    /// Creates an empty buffer (filled later via [`update`](Self::update)).
    #[must_use]
    pub fn empty(usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self::from_bytes(&[], usage, label)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    #[must_use]
    pub fn usage(&self) -> wgpu::BufferUsages {
        self.0.usage
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Current version. Incremented on every [`update`](Self::update);
    /// the resource manager re-uploads when this runs ahead of the GPU copy.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.version.load(Ordering::Relaxed)
    }

    /// Byte length of the CPU payload.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.0.data.read().unwrap().len()
    }

    /// Replaces the payload and bumps the version.
    pub fn update<T: Pod>(&self, data: &[T]) {
        {
            let mut inner = self.0.data.write().unwrap();
            let bytes: &[u8] = bytemuck::cast_slice(data);
            inner.clear();
            inner.extend_from_slice(bytes);
        }
        self.0.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Read access to the raw payload.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, Vec<u8>> {
        self.0.data.read().unwrap()
    }

    /// Whether the buffer was created with all of the given usage flags.
    ///
    /// The fur buffer resolver uses this to verify raw-access mode
    /// (`STORAGE` for vertex streams, `INDEX` for the index stream) before
    /// handing a handle to the draw orchestrator.
    #[inline]
    #[must_use]
    pub fn supports(&self, usage: wgpu::BufferUsages) -> bool {
        self.0.usage.contains(usage)
    }
}
