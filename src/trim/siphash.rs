//! SipHash-2-4 edge-to-node mapping.
//!
//! Cuckatoo graphs are implicit: edge `e` connects node `sipnode(e, 0)` on
//! the U side to node `sipnode(e, 1)` on the V side, where `sipnode` is
//! SipHash-2-4 over the nonce `2 * e + side`, truncated to the node space.
//! The variant used here initializes the internal state directly from the
//! four 64-bit keys, as the cuckoo-cycle family does, rather than from the
//! two-key schedule of the original SipHash paper.
//!
//! The compute kernel carries an equivalent formulation over `vec2<u32>`
//! pairs; [`ReferenceTrimmer`](crate::trim::ReferenceTrimmer) pins the two
//! against each other.

use crate::trim::schedule::Side;

/// The four 64-bit SipHash keys identifying a graph.
///
/// Derived from a block header in a real proof-of-work setting; fixed
/// test keys are fine for trimming throughput work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SipKeys {
    /// Key word 0 (initial state `v0`).
    pub k0: u64,
    /// Key word 1 (initial state `v1`).
    pub k1: u64,
    /// Key word 2 (initial state `v2`).
    pub k2: u64,
    /// Key word 3 (initial state `v3`, XORed with the nonce).
    pub k3: u64,
}

impl SipKeys {
    /// Keys for the all-zero test header used across cuckoo-cycle
    /// implementations; handy as a deterministic default.
    pub const TEST_HEADER: Self = Self {
        k0: 0xa34c_6a2b_daa0_3a14,
        k1: 0xd736_650a_e53e_ee9e,
        k2: 0x9a22_f05e_3bff_ed5e,
        k3: 0xb8d5_5478_fa3a_606d,
    };

    /// Split each key into `(lo, hi)` 32-bit halves for the kernel
    /// parameter block.
    #[must_use]
    pub const fn to_halves(self) -> [[u32; 2]; 4] {
        [
            split_u64(self.k0),
            split_u64(self.k1),
            split_u64(self.k2),
            split_u64(self.k3),
        ]
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn split_u64(x: u64) -> [u32; 2] {
    [x as u32, (x >> 32) as u32]
}

fn sip_round(v: &mut [u64; 4]) {
    v[0] = v[0].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(13);
    v[1] ^= v[0];
    v[0] = v[0].rotate_left(32);
    v[2] = v[2].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(16);
    v[3] ^= v[2];
    v[0] = v[0].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(21);
    v[3] ^= v[0];
    v[2] = v[2].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(17);
    v[1] ^= v[2];
    v[2] = v[2].rotate_left(32);
}

/// SipHash-2-4 of a single 64-bit nonce under `keys`.
#[must_use]
pub fn siphash24(keys: SipKeys, nonce: u64) -> u64 {
    let mut v = [keys.k0, keys.k1, keys.k2, keys.k3 ^ nonce];
    sip_round(&mut v);
    sip_round(&mut v);
    v[0] ^= nonce;
    v[2] ^= 0xff;
    for _ in 0..4 {
        sip_round(&mut v);
    }
    (v[0] ^ v[1]) ^ (v[2] ^ v[3])
}

/// Maps an edge index to a node id on one endpoint side.
///
/// The GPU kernel hard-codes the SipHash mapping; this trait exists so the
/// CPU reference model can also run on small hand-built graphs with known
/// structure.
pub trait NodeHasher {
    /// Node id of `edge`'s endpoint on `side`.
    fn node(&self, edge: u32, side: Side) -> u32;
}

/// The production [`NodeHasher`]: `siphash24(keys, 2 * edge + side)`
/// masked to `edge_bits` bits.
#[derive(Debug, Clone, Copy)]
pub struct SipNodeHasher {
    keys: SipKeys,
    node_mask: u32,
}

impl SipNodeHasher {
    /// Hasher for a graph with `2^edge_bits` edges per side.
    ///
    /// `edge_bits` must be in `1..=31`, as enforced by
    /// [`TrimConfig`](crate::config::TrimConfig).
    #[must_use]
    pub fn new(keys: SipKeys, edge_bits: u32) -> Self {
        debug_assert!((1..=31).contains(&edge_bits));
        #[allow(clippy::cast_possible_truncation)]
        let node_mask = ((1u64 << edge_bits) - 1) as u32;
        Self { keys, node_mask }
    }

    /// The node-space mask (`2^edge_bits - 1`).
    #[must_use]
    pub const fn node_mask(&self) -> u32 {
        self.node_mask
    }
}

impl NodeHasher for SipNodeHasher {
    fn node(&self, edge: u32, side: Side) -> u32 {
        let nonce = 2 * u64::from(edge) + u64::from(side.bit());
        #[allow(clippy::cast_possible_truncation)]
        let hash = siphash24(self.keys, nonce) as u32;
        hash & self.node_mask
    }
}
