//! The consumed skinning-system contract.
//!
//! Skinning deformation itself is external: some host system (GPU compute,
//! CPU skinning, a readback of a skinned mesh) rewrites the deformed
//! vertex buffer every frame. The fur passes only consume the results
//! through [`SkinSource`], re-resolving the deformed handle every frame —
//! its backing storage may be reallocated or rewritten between frames, so
//! it is never cached across them.
//!
//! The *write-before-read ordering* between the skinning system and the
//! fur draw is an external invariant: the host frame graph runs skinning
//! before the fur pass records its commands. This module depends on that
//! ordering, it does not enforce it.

use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::resources::buffer::BufferRef;

// ─── Vertex layout contracts ──────────────────────────────────────────────────

/// Vertex stream semantics a skin source can be asked for.
///
/// The fur shader repurposes a texture-coordinate stream
/// ([`VertexSemantic::TexCoord1`] by convention) to carry static
/// per-vertex fur attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    TexCoord0,
    TexCoord1,
}

/// Layout of one deformed vertex as the skinning system writes it and the
/// fur vertex stage pulls it.
///
/// The shader indexes the raw buffer with this exact stride (24 bytes, six
/// floats). A mismatch between this struct and the shader's manual
/// indexing is silent corruption, not a caught error — keep the two in
/// lockstep.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DeformedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Static per-vertex fur attributes, carried on the repurposed
/// texture-coordinate stream. Same lockstep caveat as [`DeformedVertex`]
/// (16 bytes, four floats).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FurAttribute {
    pub uv: [f32; 2],
    /// Per-vertex strand length multiplier.
    pub length: f32,
    /// Per-vertex stiffness, `0.0..=1.0`.
    pub stiffness: f32,
}

/// Byte stride the fur shader assumes for the deformed stream.
pub const DEFORMED_VERTEX_STRIDE: usize = size_of::<DeformedVertex>();
/// Byte stride the fur shader assumes for the static attribute stream.
pub const FUR_ATTRIBUTE_STRIDE: usize = size_of::<FurAttribute>();

// ─── Skin source contract ─────────────────────────────────────────────────────

/// Per-frame access to a skinned mesh's raw GPU buffers.
///
/// Any method may return `None` on any given frame (mesh not ready,
/// storage being reallocated, raw access not enabled). Callers treat that
/// as "skip this frame's draw", never as a fatal condition.
pub trait SkinSource {
    /// The live deformed vertex buffer for the current frame.
    ///
    /// Must be requested fresh every invocation; the handle identity
    /// changes when the skinning system reallocates its storage.
    fn deformed_vertex_buffer(&self) -> Option<BufferRef>;

    /// The static vertex stream carrying the given semantic. Immutable for
    /// the mesh's lifetime unless the mesh itself changes.
    fn static_vertex_buffer(&self, semantic: VertexSemantic) -> Option<BufferRef>;

    /// The index buffer and its index count.
    fn index_buffer(&self) -> Option<(BufferRef, u32)>;
}

// ─── Concrete host-side implementation ────────────────────────────────────────

/// Buffer registry for one skinned mesh, owned by the host.
///
/// The host's skinning step calls [`set_deformed`](Self::set_deformed)
/// whenever it (re)allocates deformed storage and updates the buffer
/// contents in place otherwise. Static streams and indices are registered
/// once at mesh build time.
///
/// Interior mutability lets the host mutate the registry through the same
/// shared handle the fur pass resolves from; the host frame graph orders
/// the writes before the reads.
#[derive(Debug, Default)]
pub struct SkinnedMeshBuffers {
    inner: RwLock<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    deformed: Option<BufferRef>,
    streams: FxHashMap<VertexSemantic, BufferRef>,
    indices: Option<(BufferRef, u32)>,
}

impl SkinnedMeshBuffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) the deformed vertex buffer.
    pub fn set_deformed(&self, buffer: BufferRef) {
        self.inner.write().unwrap().deformed = Some(buffer);
    }

    /// Drops the deformed buffer, e.g. while the skinning system
    /// reallocates. Resolution fails until a new one is installed.
    pub fn clear_deformed(&self) {
        self.inner.write().unwrap().deformed = None;
    }

    /// Registers a static vertex stream under a semantic.
    pub fn set_stream(&self, semantic: VertexSemantic, buffer: BufferRef) {
        self.inner.write().unwrap().streams.insert(semantic, buffer);
    }

    /// Registers the index buffer with its index count.
    pub fn set_indices(&self, buffer: BufferRef, index_count: u32) {
        self.inner.write().unwrap().indices = Some((buffer, index_count));
    }
}

impl SkinSource for SkinnedMeshBuffers {
    fn deformed_vertex_buffer(&self) -> Option<BufferRef> {
        self.inner.read().unwrap().deformed.clone()
    }

    fn static_vertex_buffer(&self, semantic: VertexSemantic) -> Option<BufferRef> {
        self.inner.read().unwrap().streams.get(&semantic).cloned()
    }

    fn index_buffer(&self) -> Option<(BufferRef, u32)> {
        self.inner.read().unwrap().indices.clone()
    }
}
