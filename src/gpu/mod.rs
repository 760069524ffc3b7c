//! GPU trimming engine.
//!
//! # Architecture
//!
//! - `device`: wgpu adapter/device lifecycle and selection
//! - `buffers`: the four device-resident trimming buffers
//! - `dispatch`: chunked execution of one kernel pass over the edge space
//! - `readback`: staging-buffer copy of the survivor list to the host
//! - `engine`: the round loop driving a full trimming run
//!
//! One compute kernel (`shaders/lean_round.wgsl`) implements all three
//! phases; a uniform parameter block selects the phase, side, and chunk
//! per dispatch.

use thiserror::Error;

use crate::config::ConfigError;
use crate::trim::schedule::Mode;

mod buffers;
mod device;
mod dispatch;
mod engine;
mod readback;

pub use buffers::TrimBuffers;
pub use device::{GpuDevice, GpuDeviceError};
pub use dispatch::{Chunk, ChunkPlan};
pub use engine::LeanTrimmer;

/// Errors from a trimming run, one variant per failing stage.
#[derive(Debug, Error)]
pub enum TrimError {
    /// The configuration was rejected before any GPU work.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Adapter or device initialization failed.
    #[error("GPU device initialization failed: {0}")]
    DeviceInit(#[from] GpuDeviceError),

    /// A device buffer could not be allocated.
    #[error("buffer allocation failed for {region} ({bytes} bytes): {detail}")]
    Allocation {
        /// Which buffer region failed (`alive`, `counters`, ...).
        region: &'static str,
        /// Requested size in bytes.
        bytes: u64,
        /// Backend error message.
        detail: String,
    },

    /// The kernel failed to compile or the pipeline failed validation.
    #[error("kernel compilation failed: {0}")]
    Compile(String),

    /// A dispatched pass failed validation.
    #[error("dispatch failed in round {round} ({mode:?} pass): {detail}")]
    Dispatch {
        /// Round index the failing pass belonged to.
        round: u32,
        /// Phase of the failing pass.
        mode: Mode,
        /// Backend error message.
        detail: String,
    },

    /// Copying or mapping the survivor list back to the host failed.
    #[error("survivor readback failed: {0}")]
    Map(String),
}

impl TrimError {
    /// Process exit code for this error class, used by the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::DeviceInit(_) => 2,
            Self::Allocation { .. } => 3,
            Self::Compile(_) => 4,
            Self::Dispatch { .. } => 5,
            Self::Map(_) => 6,
        }
    }
}
