//! Trimming run configuration and derived buffer geometry.
//!
//! All buffer sizes and dispatch counts derive from three knobs: the
//! edge-space exponent, the round count, and the number of workgroups per
//! dispatch chunk. Nothing downstream hard-codes a size.

use thiserror::Error;

/// Invocations per workgroup. Baked into the kernel's `@workgroup_size`,
/// so it is fixed at compile time.
pub const GROUP_SIZE: u32 = 256;

/// Default edge-space exponent (2^29 edges per side).
pub const DEFAULT_EDGE_BITS: u32 = 29;

/// Default number of trimming rounds.
pub const DEFAULT_ROUNDS: u32 = 60;

/// Default workgroups per dispatch chunk.
pub const DEFAULT_GROUPS_PER_CHUNK: u32 = 1024;

/// Survivor-list capacity cap in edges. Lean trimming at full size leaves
/// far fewer survivors than this; smaller graphs are capped by their own
/// edge count instead.
const AUX_EDGE_CAP: u64 = 4 * 1024 * 1024;

/// Largest dispatch size wgpu guarantees per dimension.
const MAX_WORKGROUPS_PER_DISPATCH: u32 = 65_535;

/// A rejected [`TrimConfig`] field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Edge-space exponent outside the supported range.
    #[error("edge_bits must be in 1..=31, got {0}")]
    EdgeBits(u32),
    /// Zero rounds would never produce a survivor list.
    #[error("rounds must be at least 1, got {0}")]
    Rounds(u32),
    /// Chunk sizing outside what a single dispatch can carry.
    #[error("groups_per_chunk must be in 1..=65535, got {0}")]
    GroupsPerChunk(u32),
}

/// Sizing and scheduling knobs for a trimming engine.
///
/// # Example
///
/// ```
/// use cuckatoo_lean::config::TrimConfig;
///
/// let config = TrimConfig::default();
/// assert_eq!(config.num_edges(), 1 << 29);
/// assert_eq!(config.alive_bytes(), (1 << 29) / 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimConfig {
    /// Edge-space exponent: the graph has `2^edge_bits` edges and the
    /// same number of nodes on each side.
    pub edge_bits: u32,
    /// Number of trimming rounds; the last round extracts survivors.
    pub rounds: u32,
    /// Workgroups launched per dispatch chunk.
    pub groups_per_chunk: u32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            edge_bits: DEFAULT_EDGE_BITS,
            rounds: DEFAULT_ROUNDS,
            groups_per_chunk: DEFAULT_GROUPS_PER_CHUNK,
        }
    }
}

impl TrimConfig {
    /// Validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a field is out of range.
    pub fn new(edge_bits: u32, rounds: u32, groups_per_chunk: u32) -> Result<Self, ConfigError> {
        let config = Self {
            edge_bits,
            rounds,
            groups_per_chunk,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its supported range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=31).contains(&self.edge_bits) {
            return Err(ConfigError::EdgeBits(self.edge_bits));
        }
        if self.rounds == 0 {
            return Err(ConfigError::Rounds(self.rounds));
        }
        if !(1..=MAX_WORKGROUPS_PER_DISPATCH).contains(&self.groups_per_chunk) {
            return Err(ConfigError::GroupsPerChunk(self.groups_per_chunk));
        }
        Ok(())
    }

    /// Total number of edges, `2^edge_bits`.
    #[must_use]
    pub const fn num_edges(&self) -> u64 {
        1u64 << self.edge_bits
    }

    /// Nodes per side; equal to the edge count in Cuckatoo.
    #[must_use]
    pub const fn num_nodes(&self) -> u64 {
        self.num_edges()
    }

    /// Mask truncating a hash to the node space.
    #[must_use]
    pub const fn node_mask(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let mask = (self.num_edges() - 1) as u32;
        mask
    }

    /// Edges covered by one dispatch chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> u64 {
        GROUP_SIZE as u64 * self.groups_per_chunk as u64
    }

    /// Dispatches needed to cover the edge space once.
    #[must_use]
    pub const fn num_chunks(&self) -> u64 {
        self.num_edges().div_ceil(self.chunk_size())
    }

    /// Size of the alive bitmap in bytes (one bit per edge).
    #[must_use]
    pub const fn alive_bytes(&self) -> u64 {
        self.num_edges().div_ceil(32) * 4
    }

    /// Words in one counter bit-plane (one bit per node).
    #[must_use]
    pub const fn counter_plane_words(&self) -> u64 {
        self.num_nodes().div_ceil(32)
    }

    /// Size of the two-plane counter buffer in bytes.
    #[must_use]
    pub const fn counter_bytes(&self) -> u64 {
        2 * self.counter_plane_words() * 4
    }

    /// Words in one aux survivor buffer: a count word plus capacity for
    /// `min(num_edges, 4M)` edge indices.
    #[must_use]
    pub const fn aux_words(&self) -> u32 {
        let cap = if self.num_edges() < AUX_EDGE_CAP {
            self.num_edges()
        } else {
            AUX_EDGE_CAP
        };
        #[allow(clippy::cast_possible_truncation)]
        let words = (cap + 1) as u32;
        words
    }

    /// Size of one aux survivor buffer in bytes.
    #[must_use]
    pub const fn aux_bytes(&self) -> u64 {
        self.aux_words() as u64 * 4
    }

    /// Total device memory the engine will request, in bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.alive_bytes() + self.counter_bytes() + 2 * self.aux_bytes()
    }
}
