//! Graph definition and CPU-side trimming model.
//!
//! The GPU engine in [`crate::gpu`] executes the same algorithm these
//! modules describe: [`siphash`] defines the implicit edge-to-node
//! mapping, [`schedule`] the round/phase state machine, and [`reference`]
//! a serial model with the exact buffer semantics of the compute kernel.

pub mod reference;
pub mod schedule;
pub mod siphash;

pub use reference::ReferenceTrimmer;
pub use schedule::{Mode, Round, RoundSchedule, Side};
pub use siphash::{siphash24, NodeHasher, SipKeys, SipNodeHasher};

/// Outcome of a trimming run.
///
/// Produced by both [`ReferenceTrimmer::run`] and
/// [`LeanTrimmer::trim`](crate::gpu::LeanTrimmer::trim), so the two can be
/// compared directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimResult {
    /// Number of surviving edges.
    pub count: u32,
    /// Indices of the surviving edges.
    ///
    /// The GPU appends concurrently, so order is arbitrary there; the
    /// reference model emits ascending order. Sort before comparing sets.
    pub survivors: Vec<u32>,
    /// Side the extracting round ran on, selecting which aux buffer the
    /// list came from.
    pub side: Side,
}

impl TrimResult {
    /// Survivor indices as a sorted vector, for order-insensitive
    /// comparison.
    #[must_use]
    pub fn sorted_survivors(&self) -> Vec<u32> {
        let mut edges = self.survivors.clone();
        edges.sort_unstable();
        edges
    }
}
