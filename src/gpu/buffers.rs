//! Device-resident trimming buffers.
//!
//! Four regions live on the GPU for the whole run:
//!
//! - `alive`: one bit per edge, initialized all-ones, only ever cleared
//! - `counters`: two bit-planes per node (seen-once, then seen-twice at a
//!   `plane_words` offset), zeroed before every count pass
//! - `aux` pair: survivor lists, word 0 a running count followed by edge
//!   indices; the extracting round writes the one selected by its side
//!   while the other stays untouched
//! - `params`: the uniform block rewritten before every dispatch
//!
//! Allocation failures surface through wgpu error scopes; `create_buffer`
//! itself never fails.

use crate::config::TrimConfig;
use crate::trim::schedule::Side;

use super::device::GpuDevice;
use super::dispatch::KernelParams;
use super::TrimError;

/// The trimming working set on one device.
#[derive(Debug)]
pub struct TrimBuffers {
    alive: wgpu::Buffer,
    counters: wgpu::Buffer,
    aux: [wgpu::Buffer; 2],
    params: wgpu::Buffer,
    config: TrimConfig,
}

/// Create one buffer inside an out-of-memory error scope.
async fn create_checked(
    device: &GpuDevice,
    label: &str,
    region: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> Result<wgpu::Buffer, TrimError> {
    device
        .device()
        .push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let buffer = device.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    });
    if let Some(error) = device.device().pop_error_scope().await {
        return Err(TrimError::Allocation {
            region,
            bytes: size,
            detail: error.to_string(),
        });
    }
    Ok(buffer)
}

impl TrimBuffers {
    /// Allocate every region `config` calls for.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::Allocation`] when a region exceeds the device
    /// limits or the device reports out-of-memory.
    pub async fn allocate(device: &GpuDevice, config: &TrimConfig) -> Result<Self, TrimError> {
        let limits = device.device().limits();
        let binding_cap = u64::from(limits.max_storage_buffer_binding_size);
        let largest = config
            .alive_bytes()
            .max(config.counter_bytes())
            .max(config.aux_bytes());
        if largest > binding_cap || largest > limits.max_buffer_size {
            return Err(TrimError::Allocation {
                region: "storage",
                bytes: largest,
                detail: format!(
                    "exceeds device limits (max binding {binding_cap}, max buffer {})",
                    limits.max_buffer_size
                ),
            });
        }

        let alive = create_checked(
            device,
            "alive bitmap",
            "alive",
            config.alive_bytes(),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        )
        .await?;

        let counters = create_checked(
            device,
            "node counters",
            "counters",
            config.counter_bytes(),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        )
        .await?;

        let aux_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        let aux_a = create_checked(device, "aux survivors A", "aux", config.aux_bytes(), aux_usage)
            .await?;
        let aux_b = create_checked(device, "aux survivors B", "aux", config.aux_bytes(), aux_usage)
            .await?;

        let params = create_checked(
            device,
            "kernel params",
            "params",
            std::mem::size_of::<KernelParams>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
        .await?;

        Ok(Self {
            alive,
            counters,
            aux: [aux_a, aux_b],
            params,
            config: *config,
        })
    }

    /// Bring the working set to the run-start state: every alive bit set,
    /// both aux lists empty. Counters are cleared per round instead.
    ///
    /// Trailing alive bits past `num_edges` in the last word are set too;
    /// the kernel's edge-count bound keeps them from ever being read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn reset_for_run(&self, device: &GpuDevice) {
        let ones = vec![0xFFu8; self.config.alive_bytes() as usize];
        device.queue().write_buffer(&self.alive, 0, &ones);

        let mut encoder = device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("aux clear encoder"),
            });
        encoder.clear_buffer(&self.aux[0], 0, None);
        encoder.clear_buffer(&self.aux[1], 0, None);
        device.queue().submit(Some(encoder.finish()));
    }

    /// Zero both counter planes. Runs before every count pass; queue
    /// ordering sequences it ahead of the dispatches that follow.
    pub fn clear_counters(&self, device: &GpuDevice) {
        let mut encoder = device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("counter clear encoder"),
            });
        encoder.clear_buffer(&self.counters, 0, None);
        device.queue().submit(Some(encoder.finish()));
    }

    /// The alive bitmap.
    #[must_use]
    pub const fn alive(&self) -> &wgpu::Buffer {
        &self.alive
    }

    /// The two-plane counter buffer.
    #[must_use]
    pub const fn counters(&self) -> &wgpu::Buffer {
        &self.counters
    }

    /// The aux survivor buffer written by extracting rounds on `side`
    /// (U-side rounds target A, V-side rounds target B).
    #[must_use]
    pub const fn aux(&self, side: Side) -> &wgpu::Buffer {
        &self.aux[side.bit() as usize]
    }

    /// The uniform parameter block.
    #[must_use]
    pub const fn params(&self) -> &wgpu::Buffer {
        &self.params
    }

    /// Geometry this working set was allocated for.
    #[must_use]
    pub const fn config(&self) -> &TrimConfig {
        &self.config
    }
}
