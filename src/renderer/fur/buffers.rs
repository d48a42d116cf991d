//! Per-frame buffer resolution and leasing.
//!
//! Every frame the fur pass acquires the skinned target's raw buffer
//! handles fresh from the skinning system — the deformed stream's backing
//! storage may have been reallocated since the last frame, so a cached
//! handle is a stale handle. The handles acquired for one frame form a
//! [`BufferLease`] that the orchestrator owns for exactly that frame and
//! releases at cleanup on every exit path, including when resolution
//! failed partway. The [`LeaseLedger`] makes that accounting observable:
//! `acquired == released` must hold at every frame boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::resources::buffer::BufferRef;
use crate::skinning::{DEFORMED_VERTEX_STRIDE, FUR_ATTRIBUTE_STRIDE, SkinSource, VertexSemantic};

// ─── Lease accounting ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct LedgerCounters {
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Shared acquire/release counters for per-frame buffer handles.
#[derive(Debug, Clone, Default)]
pub struct LeaseLedger(Arc<LedgerCounters>);

impl LeaseLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn acquired(&self) -> u64 {
        self.0.acquired.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn released(&self) -> u64 {
        self.0.released.load(Ordering::Relaxed)
    }

    /// Whether every acquired handle has been released.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.acquired() == self.released()
    }

    fn note_acquired(&self, n: u64) {
        self.0.acquired.fetch_add(n, Ordering::Relaxed);
    }

    fn note_released(&self, n: u64) {
        self.0.released.fetch_add(n, Ordering::Relaxed);
    }
}

/// The raw buffer handles held for the current frame.
///
/// Exclusively owned by the draw orchestrator for one frame. [`release`]
/// drops every held handle and records the release in the ledger; `Drop`
/// is a backstop so a lease abandoned on an error path still balances.
///
/// [`release`]: Self::release
#[derive(Debug)]
pub struct BufferLease {
    held: Vec<BufferRef>,
    ledger: LeaseLedger,
}

impl BufferLease {
    fn new(ledger: LeaseLedger) -> Self {
        Self {
            held: Vec::with_capacity(3),
            ledger,
        }
    }

    fn track(&mut self, buffer: &BufferRef) {
        self.held.push(buffer.clone());
        self.ledger.note_acquired(1);
    }

    /// Number of handles currently held.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Releases every held handle. Idempotent.
    pub fn release(&mut self) {
        let n = self.held.len() as u64;
        if n > 0 {
            self.held.clear();
            self.ledger.note_released(n);
        }
    }
}

impl Drop for BufferLease {
    fn drop(&mut self) {
        self.release();
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// The buffer handles one procedural fur draw consumes.
#[derive(Debug, Clone)]
pub struct ResolvedFurBuffers {
    /// Live deformed vertex data, rewritten per frame by the skinning system.
    pub deformed: BufferRef,
    /// Static per-vertex fur attributes.
    pub attributes: BufferRef,
    /// Index buffer.
    pub indices: BufferRef,
    /// Index count; must equal the draw's index-count argument exactly.
    pub index_count: u32,
}

/// Resolves the skinned target's buffers for this frame.
///
/// Returns the lease (always — partial acquisitions on the failure path
/// still need releasing at cleanup) and the resolved set on success.
/// `None` means "skip this frame's draw and retry next frame
/// unconditionally": the mesh may not be ready, or raw-access usage
/// (`STORAGE` on vertex streams, `INDEX` on the index stream) is missing
/// from a buffer.
pub fn resolve_fur_buffers(
    skin: &dyn SkinSource,
    semantic: VertexSemantic,
    ledger: &LeaseLedger,
) -> (BufferLease, Option<ResolvedFurBuffers>) {
    let mut lease = BufferLease::new(ledger.clone());

    let Some(deformed) = skin
        .deformed_vertex_buffer()
        .filter(|b| b.supports(wgpu::BufferUsages::STORAGE))
    else {
        log::debug!("fur: deformed vertex buffer unavailable this frame");
        return (lease, None);
    };
    lease.track(&deformed);
    debug_assert_eq!(
        deformed.byte_len() % DEFORMED_VERTEX_STRIDE,
        0,
        "deformed stream length is not a multiple of the shader stride"
    );

    let Some(attributes) = skin
        .static_vertex_buffer(semantic)
        .filter(|b| b.supports(wgpu::BufferUsages::STORAGE))
    else {
        log::debug!("fur: static attribute stream {semantic:?} unavailable this frame");
        return (lease, None);
    };
    lease.track(&attributes);
    debug_assert_eq!(
        attributes.byte_len() % FUR_ATTRIBUTE_STRIDE,
        0,
        "attribute stream length is not a multiple of the shader stride"
    );

    let Some((indices, index_count)) = skin
        .index_buffer()
        .filter(|(b, _)| b.supports(wgpu::BufferUsages::INDEX))
    else {
        log::debug!("fur: index buffer unavailable this frame");
        return (lease, None);
    };
    lease.track(&indices);

    let resolved = ResolvedFurBuffers {
        deformed,
        attributes,
        indices,
        index_count,
    };
    (lease, Some(resolved))
}
