//! GPU device initialization and adapter selection.
//!
//! Handles wgpu instance/adapter/device lifecycle, including picking an
//! adapter by name substring and index on multi-GPU hosts.

use thiserror::Error;

/// GPU device initialization errors.
#[derive(Debug, Error)]
pub enum GpuDeviceError {
    /// No compatible GPU adapter found
    #[error("No compatible GPU adapter found")]
    NoAdapter,

    /// No adapter name matched the requested filter
    #[error("No GPU adapter matching '{filter}' found")]
    NoAdapterMatch {
        /// The name substring that matched nothing.
        filter: String,
    },

    /// Adapter index out of range for the matching set
    #[error("Adapter index {index} out of range ({available} matching adapters)")]
    AdapterIndex {
        /// Requested index.
        index: usize,
        /// Number of adapters that matched the filter.
        available: usize,
    },

    /// Failed to request GPU device
    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(String),
}

/// GPU device wrapper owning the wgpu device/queue pair.
///
/// # Example
///
/// ```ignore
/// # use cuckatoo_lean::gpu::GpuDevice;
/// let device = GpuDevice::new().await?;
/// println!("trimming on {}", device.info().name);
/// ```
#[derive(Debug)]
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

impl GpuDevice {
    /// Check if a GPU is available without keeping a device.
    ///
    /// This is useful for tests to skip gracefully when GPU is not available.
    pub async fn is_gpu_available() -> bool {
        Self::new().await.is_ok()
    }

    /// Initialize the highest-performance adapter wgpu can find.
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if no adapter is found or the device
    /// request fails.
    pub async fn new() -> Result<Self, GpuDeviceError> {
        Self::new_with_backend(wgpu::Backends::all()).await
    }

    /// Initialize GPU device with a specific backend set.
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if device initialization fails
    pub async fn new_with_backend(backends: wgpu::Backends) -> Result<Self, GpuDeviceError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuDeviceError::NoAdapter)?;

        Self::from_adapter(adapter).await
    }

    /// Pick an adapter by name substring (case-insensitive) and index
    /// within the matching set, e.g. `("NVIDIA", 0)` or `("AMD", 1)`.
    /// With no filter, the index selects among all adapters.
    ///
    /// # Errors
    ///
    /// Returns `GpuDeviceError` if nothing matches the filter, the index
    /// is out of range, or the device request fails.
    pub async fn with_selector(
        name_filter: Option<&str>,
        index: usize,
    ) -> Result<Self, GpuDeviceError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let mut adapters = instance.enumerate_adapters(wgpu::Backends::all());
        if let Some(filter) = name_filter {
            let needle = filter.to_lowercase();
            adapters.retain(|a| a.get_info().name.to_lowercase().contains(&needle));
            if adapters.is_empty() {
                return Err(GpuDeviceError::NoAdapterMatch {
                    filter: filter.to_string(),
                });
            }
        } else if adapters.is_empty() {
            return Err(GpuDeviceError::NoAdapter);
        }

        let available = adapters.len();
        let adapter = adapters
            .into_iter()
            .nth(index)
            .ok_or(GpuDeviceError::AdapterIndex { index, available })?;

        Self::from_adapter(adapter).await
    }

    /// Request a device/queue pair on `adapter`, asking for the adapter's
    /// own limits so storage buffers above wgpu's conservative defaults
    /// (large edge spaces) remain bindable.
    async fn from_adapter(adapter: wgpu::Adapter) -> Result<Self, GpuDeviceError> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("cuckatoo-lean GPU device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| GpuDeviceError::DeviceRequest(e.to_string()))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Get adapter info (GPU name, backend, etc.)
    #[must_use]
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Get device reference
    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get queue reference
    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
