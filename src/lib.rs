//! cuckatoo-lean: GPU lean edge trimming for Cuckatoo proof-of-work graphs.
//!
//! # Overview
//!
//! A Cuckatoo graph is implicit: edge `e` connects `siphash(2e)` on the U
//! side to `siphash(2e + 1)` on the V side. Lean trimming repeatedly
//! removes edges with a degree-1 endpoint, shrinking 2^29 candidate edges
//! to the small survivor set worth cycle-searching, while keeping device
//! memory at one alive bit per edge plus two counter bits per node.
//!
//! # Quick Start
//!
//! ```no_run
//! use cuckatoo_lean::config::TrimConfig;
//! use cuckatoo_lean::gpu::{GpuDevice, LeanTrimmer};
//! use cuckatoo_lean::trim::SipKeys;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let device = GpuDevice::new().await?;
//! let mut trimmer = LeanTrimmer::new(device, TrimConfig::default()).await?;
//!
//! let result = trimmer.trim(SipKeys::TEST_HEADER).await?;
//! println!("trimmed to {} edges", result.count);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **`trim`**: the graph definition (SipHash endpoints), the round
//!   schedule, and a serial reference model with kernel-identical buffer
//!   semantics
//! - **`gpu`**: the wgpu engine: buffers, chunked dispatch, readback
//! - **`config`**: geometry derivation from the edge-space exponent

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod gpu;
pub mod trim;

// Re-export core types
pub use config::{ConfigError, TrimConfig};
pub use gpu::{GpuDevice, GpuDeviceError, LeanTrimmer, TrimError};
pub use trim::{
    Mode, NodeHasher, ReferenceTrimmer, RoundSchedule, Side, SipKeys, SipNodeHasher, TrimResult,
};

// Error type
pub use anyhow::{Error, Result};
