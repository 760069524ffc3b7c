//! The trimming engine: pipeline setup and the round loop.

use log::{debug, info};

use crate::config::TrimConfig;
use crate::trim::schedule::{Mode, RoundSchedule, Side};
use crate::trim::siphash::SipKeys;
use crate::trim::TrimResult;

use super::buffers::TrimBuffers;
use super::device::GpuDevice;
use super::dispatch::{run_pass, ChunkPlan, KernelParams};
use super::readback::read_survivors;
use super::TrimError;

const SHADER: &str = include_str!("shaders/lean_round.wgsl");

/// GPU lean trimmer for one graph size.
///
/// Owns the device working set; one instance runs any number of trims at
/// the configured geometry, each with its own keys.
///
/// # Example
///
/// ```ignore
/// # use cuckatoo_lean::config::TrimConfig;
/// # use cuckatoo_lean::gpu::{GpuDevice, LeanTrimmer};
/// # use cuckatoo_lean::trim::SipKeys;
/// let device = GpuDevice::new().await?;
/// let mut trimmer = LeanTrimmer::new(device, TrimConfig::default()).await?;
/// let result = trimmer.trim(SipKeys::TEST_HEADER).await?;
/// println!("trimmed to {} edges", result.count);
/// ```
#[derive(Debug)]
pub struct LeanTrimmer {
    device: GpuDevice,
    config: TrimConfig,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    buffers: TrimBuffers,
}

impl LeanTrimmer {
    /// Validate `config`, allocate the working set, and compile the
    /// kernel on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::Config`], [`TrimError::Allocation`], or
    /// [`TrimError::Compile`] depending on the failing stage.
    pub async fn new(device: GpuDevice, config: TrimConfig) -> Result<Self, TrimError> {
        config.validate()?;

        info!(
            "allocating {} MiB for 2^{} edges on {}",
            config.total_bytes() >> 20,
            config.edge_bits,
            device.info().name
        );
        let buffers = TrimBuffers::allocate(&device, &config).await?;

        device
            .device()
            .push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = device
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("lean round shader"),
                source: wgpu::ShaderSource::Wgsl(SHADER.into()),
            });

        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout =
            device
                .device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("lean round bind group layout"),
                    entries: &[
                        // @binding(0): uniform params
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // @binding(1): alive bitmap
                        storage_entry(1),
                        // @binding(2): counter planes
                        storage_entry(2),
                        // @binding(3): aux survivors A
                        storage_entry(3),
                        // @binding(4): aux survivors B
                        storage_entry(4),
                    ],
                });

        let pipeline_layout =
            device
                .device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("lean round pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

        let pipeline = device
            .device()
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("lean round pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader_module,
                entry_point: "lean_round",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        if let Some(error) = device.device().pop_error_scope().await {
            return Err(TrimError::Compile(error.to_string()));
        }

        let bind_group = device
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("lean round bind group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.params().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.alive().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.counters().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.aux(Side::U).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffers.aux(Side::V).as_entire_binding(),
                    },
                ],
            });

        Ok(Self {
            device,
            config,
            pipeline,
            bind_group,
            buffers,
        })
    }

    /// Run a full trimming run for the graph identified by `keys`.
    ///
    /// Resets the working set, runs the configured schedule (count pass
    /// then trim/extract pass per round, alternating sides), and reads
    /// the survivor list back from the final round's aux buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TrimError::Dispatch`] naming the failing round and pass,
    /// or [`TrimError::Map`] / [`TrimError::Allocation`] from readback.
    pub async fn trim(&mut self, keys: SipKeys) -> Result<TrimResult, TrimError> {
        let schedule = RoundSchedule::new(self.config.rounds);
        let plan = ChunkPlan::new(self.config.num_edges(), self.config.chunk_size());
        info!(
            "trimming 2^{} edges: {} rounds, {} chunks per pass",
            self.config.edge_bits,
            schedule.len(),
            plan.num_chunks()
        );

        self.buffers.reset_for_run(&self.device);

        for round in schedule.rounds() {
            self.buffers.clear_counters(&self.device);

            let count_params = self.params(keys, Mode::SetCount, round.side);
            run_pass(
                &self.device,
                &self.pipeline,
                &self.bind_group,
                &self.buffers,
                count_params,
                &plan,
                round.index,
                Mode::SetCount,
            )
            .await?;

            let update_params = self.params(keys, round.update_mode, round.side);
            run_pass(
                &self.device,
                &self.pipeline,
                &self.bind_group,
                &self.buffers,
                update_params,
                &plan,
                round.index,
                round.update_mode,
            )
            .await?;

            debug!("round {} dispatched on side {:?}", round.index, round.side);
        }

        let side = schedule.final_side();
        let result = read_survivors(
            &self.device,
            self.buffers.aux(side),
            self.config.aux_words(),
            side,
        )
        .await?;
        info!("trimmed to {} edges", result.count);
        Ok(result)
    }

    fn params(&self, keys: SipKeys, mode: Mode, side: Side) -> KernelParams {
        KernelParams::new(
            keys,
            self.config.num_edges(),
            self.config.node_mask(),
            self.config.aux_words(),
            self.config.counter_plane_words(),
            mode,
            side,
        )
    }

    /// Geometry this engine was built for.
    #[must_use]
    pub const fn config(&self) -> &TrimConfig {
        &self.config
    }

    /// The device the engine runs on.
    #[must_use]
    pub const fn device(&self) -> &GpuDevice {
        &self.device
    }
}
