//! Chunked kernel dispatch.
//!
//! A pass applies one `(mode, side)` phase to every edge. The edge space
//! is covered by a sequence of fixed-size chunks, each one dispatch of
//! `groups_per_chunk` workgroups; the chunk's base index reaches the
//! kernel through the uniform parameter block. Writing the block and
//! submitting the dispatch alternate on the same queue, so each dispatch
//! observes exactly the parameters written before it.

use log::trace;

use crate::config::GROUP_SIZE;
use crate::trim::schedule::{Mode, Side};
use crate::trim::siphash::SipKeys;

use super::buffers::TrimBuffers;
use super::device::GpuDevice;
use super::TrimError;

/// Uniform parameter block read by every kernel invocation.
///
/// Layout is mirrored by `struct Params` in `shaders/lean_round.wgsl`;
/// the 64-bit keys travel as `(lo, hi)` word pairs.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct KernelParams {
    k0: [u32; 2],
    k1: [u32; 2],
    k2: [u32; 2],
    k3: [u32; 2],
    edge_count: u32,
    node_mask: u32,
    mode: u32,
    side: u32,
    chunk_base: u32,
    aux_words: u32,
    plane_words: u32,
    _padding: u32,
}

impl KernelParams {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(
        keys: SipKeys,
        edge_count: u64,
        node_mask: u32,
        aux_words: u32,
        plane_words: u64,
        mode: Mode,
        side: Side,
    ) -> Self {
        let [k0, k1, k2, k3] = keys.to_halves();
        Self {
            k0,
            k1,
            k2,
            k3,
            edge_count: edge_count as u32,
            node_mask,
            mode: mode.as_u32(),
            side: side.bit(),
            chunk_base: 0,
            aux_words,
            plane_words: plane_words as u32,
            _padding: 0,
        }
    }

    pub(crate) fn with_chunk_base(self, chunk_base: u32) -> Self {
        Self { chunk_base, ..self }
    }

    pub(crate) const fn mode_u32(self) -> u32 {
        self.mode
    }
}

/// One dispatch worth of edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First edge index covered by this chunk.
    pub base: u64,
    /// Number of edges covered (full `chunk_size` except possibly last).
    pub len: u64,
}

impl Chunk {
    /// Workgroups needed to cover `len` invocations.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn workgroups(&self) -> u32 {
        self.len.div_ceil(GROUP_SIZE as u64) as u32
    }
}

/// Decomposition of an item range into dispatch chunks.
///
/// The chunk count is derived: `ceil(total / chunk_size)`, never a fixed
/// constant, so any edge-space size is covered exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Plan covering `total` items in chunks of `chunk_size`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    #[must_use]
    pub fn new(total: u64, chunk_size: u64) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self { total, chunk_size }
    }

    /// Number of dispatches in the plan.
    #[must_use]
    pub const fn num_chunks(&self) -> u64 {
        self.total.div_ceil(self.chunk_size)
    }

    /// Iterate the chunks in ascending base order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.num_chunks()).map(move |i| {
            let base = i * self.chunk_size;
            Chunk {
                base,
                len: self.chunk_size.min(self.total - base),
            }
        })
    }
}

/// Run one pass: write the parameter block and dispatch once per chunk,
/// all inside a validation error scope attributed to `round`.
///
/// Submissions land on the device queue in order, so the pass as a whole
/// behaves as if chunks executed back to back; callers sequence passes by
/// submission order alone.
#[allow(clippy::cast_possible_truncation)]
pub(crate) async fn run_pass(
    device: &GpuDevice,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    buffers: &TrimBuffers,
    params: KernelParams,
    plan: &ChunkPlan,
    round: u32,
    mode: Mode,
) -> Result<(), TrimError> {
    device
        .device()
        .push_error_scope(wgpu::ErrorFilter::Validation);

    for chunk in plan.chunks() {
        let chunk_params = params.with_chunk_base(chunk.base as u32);
        device
            .queue()
            .write_buffer(buffers.params(), 0, bytemuck::bytes_of(&chunk_params));

        let mut encoder = device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lean round encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("lean round pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, bind_group, &[]);
            compute_pass.dispatch_workgroups(chunk.workgroups(), 1, 1);
        }
        device.queue().submit(Some(encoder.finish()));

        trace!(
            "round {round} mode {} chunk base {} len {}",
            params.mode_u32(),
            chunk.base,
            chunk.len
        );
    }

    if let Some(error) = device.device().pop_error_scope().await {
        return Err(TrimError::Dispatch {
            round,
            mode,
            detail: error.to_string(),
        });
    }
    Ok(())
}
