//! CPU reference model of the lean trimming kernel.
//!
//! Mirrors the GPU data layout word for word: one alive bit per edge
//! (32 edges per `u32`), and two counter bit-planes per node (seen-once
//! and seen-twice). Every pass visits edges in index order, which computes
//! the same result as the GPU's atomic formulation because a serial
//! first-touch sets the once-plane and any later touch sets the
//! twice-plane, exactly the semantics of the kernel's atomic-OR pair.
//!
//! The model exists to validate GPU output and to run the trimming
//! properties on graphs small enough to inspect.

use log::debug;

use crate::trim::schedule::{Mode, RoundSchedule, Side};
use crate::trim::siphash::NodeHasher;
use crate::trim::TrimResult;

/// Word index and bit mask of bit `i` in a packed `u32` bitmap.
const fn word_bit(i: u32) -> (usize, u32) {
    ((i >> 5) as usize, 1u32 << (i & 31))
}

/// Serial trimmer over any [`NodeHasher`].
///
/// Node ids returned by the hasher must be below `num_edges`; the node
/// space of each side equals the edge space, as in Cuckatoo.
#[derive(Debug, Clone)]
pub struct ReferenceTrimmer<H> {
    hasher: H,
    num_edges: u32,
    alive: Vec<u32>,
    seen_once: Vec<u32>,
    seen_twice: Vec<u32>,
}

impl<H: NodeHasher> ReferenceTrimmer<H> {
    /// New trimmer with all `num_edges` edges alive and counters clear.
    ///
    /// # Panics
    ///
    /// Panics if `num_edges` is 0 or not a multiple of 32 (partial alive
    /// words would need masking the GPU layout does not do).
    #[must_use]
    pub fn new(num_edges: u32, hasher: H) -> Self {
        assert!(num_edges > 0 && num_edges % 32 == 0);
        let edge_words = (num_edges / 32) as usize;
        Self {
            hasher,
            num_edges,
            alive: vec![u32::MAX; edge_words],
            seen_once: vec![0; edge_words],
            seen_twice: vec![0; edge_words],
        }
    }

    /// Number of edges in the graph.
    #[must_use]
    pub const fn num_edges(&self) -> u32 {
        self.num_edges
    }

    /// Whether `edge`'s alive bit is set.
    #[must_use]
    pub fn is_alive(&self, edge: u32) -> bool {
        let (w, b) = word_bit(edge);
        self.alive[w] & b != 0
    }

    /// Population count of the alive bitmap.
    #[must_use]
    pub fn alive_count(&self) -> u32 {
        self.alive.iter().map(|w| w.count_ones()).sum()
    }

    /// The packed alive bitmap, one bit per edge.
    #[must_use]
    pub fn alive_words(&self) -> &[u32] {
        &self.alive
    }

    /// Indices of all alive edges, ascending.
    #[must_use]
    pub fn alive_edges(&self) -> Vec<u32> {
        (0..self.num_edges).filter(|&e| self.is_alive(e)).collect()
    }

    /// Restore the run-start state: every edge alive, counters clear.
    pub fn reset(&mut self) {
        self.alive.fill(u32::MAX);
        self.clear_counters();
    }

    /// Zero both counter planes, as done before each round's count pass.
    pub fn clear_counters(&mut self) {
        self.seen_once.fill(0);
        self.seen_twice.fill(0);
    }

    /// Whether `node`'s degree on the last-counted side reached 2.
    #[must_use]
    pub fn seen_twice(&self, node: u32) -> bool {
        let (w, b) = word_bit(node);
        self.seen_twice[w] & b != 0
    }

    /// Count pass: bump the `side` endpoint counter of every alive edge.
    pub fn count_pass(&mut self, side: Side) {
        for edge in 0..self.num_edges {
            let (w, b) = word_bit(edge);
            if self.alive[w] & b == 0 {
                continue;
            }
            let node = self.hasher.node(edge, side);
            debug_assert!(node < self.num_edges);
            let (nw, nb) = word_bit(node);
            if self.seen_once[nw] & nb != 0 {
                self.seen_twice[nw] |= nb;
            } else {
                self.seen_once[nw] |= nb;
            }
        }
    }

    /// Update pass: kill alive edges whose `side` endpoint was counted
    /// exactly once. With [`Mode::Extract`] the survivors of this pass are
    /// returned in ascending edge order; with [`Mode::Trim`] the returned
    /// list is empty.
    pub fn update_pass(&mut self, side: Side, mode: Mode) -> Vec<u32> {
        let mut survivors = Vec::new();
        for edge in 0..self.num_edges {
            let (w, b) = word_bit(edge);
            if self.alive[w] & b == 0 {
                continue;
            }
            let node = self.hasher.node(edge, side);
            let (nw, nb) = word_bit(node);
            if self.seen_twice[nw] & nb == 0 {
                self.alive[w] &= !b;
            } else if mode == Mode::Extract {
                survivors.push(edge);
            }
        }
        survivors
    }

    /// One full round: clear counters, count on `side`, then apply `mode`.
    pub fn round(&mut self, side: Side, mode: Mode) -> Vec<u32> {
        self.clear_counters();
        self.count_pass(side);
        self.update_pass(side, mode)
    }

    /// Run the whole schedule from a fresh run-start state.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(&mut self, rounds: u32) -> TrimResult {
        self.reset();
        let schedule = RoundSchedule::new(rounds);
        let mut survivors = Vec::new();
        for round in schedule.rounds() {
            survivors = self.round(round.side, round.update_mode);
            debug!(
                "round {} side {:?}: {} edges alive",
                round.index,
                round.side,
                self.alive_count()
            );
        }
        TrimResult {
            count: survivors.len() as u32,
            survivors,
            side: schedule.final_side(),
        }
    }
}
