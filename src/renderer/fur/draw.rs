//! The procedural draw orchestrator.
//!
//! One [`ProceduralFurDraw`] cycles through
//! `Idle → Configured → Bound → Submitted → Released` once per rendered
//! frame per camera, driven by the pass lifecycle hooks:
//!
//! - setup: [`configure`] with this frame's buffer lease (failed
//!   resolution leaves the cycle short-circuited — the frame ends
//!   `Idle → Released` with nothing submitted), then [`bind`] the
//!   immutable draw descriptor.
//! - execute: [`submit_with`] hands the descriptor to the recording
//!   closure exactly once.
//! - cleanup: [`finish_frame`] releases the lease unconditionally —
//!   no buffer handle outlives its frame, whatever path the frame took.
//!
//! Setup for frame N+1 never begins before cleanup of frame N completes;
//! the host pipeline's serialized per-camera pass invocation guarantees
//! that ordering, this type only checks it in debug builds.
//!
//! [`configure`]: ProceduralFurDraw::configure
//! [`bind`]: ProceduralFurDraw::bind
//! [`submit_with`]: ProceduralFurDraw::submit_with
//! [`finish_frame`]: ProceduralFurDraw::finish_frame

use glam::Mat4;
use uuid::Uuid;

use crate::renderer::fur::buffers::{BufferLease, ResolvedFurBuffers};

/// Per-frame orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Configured,
    Bound,
    Submitted,
    Released,
}

/// The immutable per-frame draw descriptor: everything one procedural
/// multi-instance draw needs. Built during setup, consumed during
/// execute, never retained across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Id of the index buffer handle ([`BufferRef::id`](crate::resources::buffer::BufferRef::id)).
    pub index_buffer: u64,
    pub index_count: u32,
    /// Object-to-world matrix applied uniformly to all instances.
    pub world: Mat4,
    /// Identity of the fur material this draw renders with.
    pub material: Uuid,
    /// Which material pass / mesh partition the draw targets.
    pub submesh_index: u32,
    pub topology: wgpu::PrimitiveTopology,
    /// One instance per fur layer; zero is a valid no-op draw.
    pub instance_count: u32,
}

/// Drives one procedural fur draw through its per-frame lifecycle.
#[derive(Debug, Default)]
pub struct ProceduralFurDraw {
    phase: DrawPhase,
    lease: Option<BufferLease>,
    resolved: Option<ResolvedFurBuffers>,
    call: Option<DrawCall>,
}

impl Default for DrawPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl ProceduralFurDraw {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Begins a frame with the resolver's output.
    ///
    /// Takes ownership of the lease either way so cleanup releases it on
    /// every path. Returns whether the frame is configured for drawing;
    /// `false` means resolution failed and this frame's draw is skipped.
    pub fn configure(
        &mut self,
        lease: BufferLease,
        resolved: Option<ResolvedFurBuffers>,
    ) -> bool {
        debug_assert!(
            matches!(self.phase, DrawPhase::Idle | DrawPhase::Released),
            "configure before the previous frame finished (host ordering violated)"
        );
        // Host ordering violation in release builds: drop the stale frame
        // rather than leak its lease.
        if let Some(mut stale) = self.lease.take() {
            stale.release();
        }
        self.call = None;

        self.resolved = resolved;
        self.lease = Some(lease);
        if self.resolved.is_some() {
            self.phase = DrawPhase::Configured;
            true
        } else {
            self.phase = DrawPhase::Idle;
            false
        }
    }

    /// The buffers resolved for this frame, when configured.
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedFurBuffers> {
        self.resolved.as_ref()
    }

    /// Attaches the finished draw descriptor. `Configured → Bound`.
    pub fn bind(&mut self, call: DrawCall) {
        debug_assert_eq!(self.phase, DrawPhase::Configured, "bind without configure");
        if self.phase != DrawPhase::Configured {
            return;
        }
        self.call = Some(call);
        self.phase = DrawPhase::Bound;
    }

    /// The descriptor bound for this frame, if any.
    #[must_use]
    pub fn call(&self) -> Option<&DrawCall> {
        self.call.as_ref()
    }

    /// Submits the frame's draw: invokes `record` with the descriptor and
    /// resolved buffers exactly once. `Bound → Submitted`.
    ///
    /// Returns `false` without invoking `record` when no draw is bound
    /// this frame (resolution failed or the frame was already submitted).
    pub fn submit_with<F>(&mut self, record: F) -> bool
    where
        F: FnOnce(&DrawCall, &ResolvedFurBuffers),
    {
        if self.phase != DrawPhase::Bound {
            return false;
        }
        let (Some(call), Some(resolved)) = (self.call.as_ref(), self.resolved.as_ref()) else {
            return false;
        };
        record(call, resolved);
        self.phase = DrawPhase::Submitted;
        true
    }

    /// Ends the frame: releases the lease and clears per-frame state,
    /// unconditionally. Any phase → `Released`.
    pub fn finish_frame(&mut self) {
        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
        self.resolved = None;
        self.call = None;
        self.phase = DrawPhase::Released;
    }
}
