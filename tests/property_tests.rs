//! Property-based tests for lean trimming
//!
//! Verifies the trimming invariants hold for arbitrary keys, sizes, and
//! schedules, using the serial reference model.

use proptest::prelude::*;

use cuckatoo_lean::gpu::ChunkPlan;
use cuckatoo_lean::trim::{
    Mode, NodeHasher, ReferenceTrimmer, RoundSchedule, Side, SipKeys, SipNodeHasher,
};

fn trimmer(edge_bits: u32, keys: SipKeys) -> ReferenceTrimmer<SipNodeHasher> {
    ReferenceTrimmer::new(1 << edge_bits, SipNodeHasher::new(keys, edge_bits))
}

// Property: the alive set only ever shrinks, round over round
proptest! {
    #[test]
    fn prop_alive_set_shrinks_monotonically(
        keys in prop_keys(),
        edge_bits in 5u32..=10,
        rounds in 1u32..=6,
    ) {
        let mut t = trimmer(edge_bits, keys);

        for round in RoundSchedule::new(rounds).rounds() {
            let before = t.alive_words().to_vec();
            t.round(round.side, round.update_mode);
            let after = t.alive_words();

            // No bit may appear that was not set before.
            for (b, a) in before.iter().zip(after.iter()) {
                prop_assert_eq!(a & !b, 0u32);
            }
        }
    }
}

// Property: after a count pass, the twice-plane is set exactly for nodes
// with two or more alive edges
proptest! {
    #[test]
    fn prop_counter_classification_matches_true_degrees(
        keys in prop_keys(),
        edge_bits in 5u32..=9,
    ) {
        let num_edges = 1u32 << edge_bits;
        let hasher = SipNodeHasher::new(keys, edge_bits);
        let mut t = ReferenceTrimmer::new(num_edges, hasher);

        // Thin the graph first so degrees vary.
        t.round(Side::V, Mode::Trim);

        t.clear_counters();
        t.count_pass(Side::U);

        let mut degrees = vec![0u32; num_edges as usize];
        for edge in t.alive_edges() {
            degrees[hasher.node(edge, Side::U) as usize] += 1;
        }
        for (node, &degree) in degrees.iter().enumerate() {
            prop_assert_eq!(
                t.seen_twice(node as u32),
                degree >= 2,
                "node {} has degree {}",
                node,
                degree
            );
        }
    }
}

// Property: the extracted survivor list is exactly the final alive set
proptest! {
    #[test]
    fn prop_survivors_equal_final_alive_set(
        keys in prop_keys(),
        edge_bits in 5u32..=10,
        rounds in 1u32..=8,
    ) {
        let mut t = trimmer(edge_bits, keys);
        let result = t.run(rounds);

        prop_assert_eq!(result.count as usize, result.survivors.len());
        prop_assert_eq!(result.sorted_survivors(), t.alive_edges());
    }
}

// Property: trimming is deterministic in keys and schedule
proptest! {
    #[test]
    fn prop_trim_is_deterministic(
        keys in prop_keys(),
        edge_bits in 5u32..=10,
        rounds in 1u32..=6,
    ) {
        let first = trimmer(edge_bits, keys).run(rounds);
        let second = trimmer(edge_bits, keys).run(rounds);
        prop_assert_eq!(first, second);
    }
}

// Property: re-trimming the side just trimmed changes nothing (each edge
// touches one node per side, so pruned edges cannot create new degree-1
// nodes on that same side)
proptest! {
    #[test]
    fn prop_retrim_same_side_is_noop(
        keys in prop_keys(),
        edge_bits in 5u32..=10,
        rounds in 1u32..=6,
    ) {
        let mut t = trimmer(edge_bits, keys);
        t.run(rounds);
        let side = RoundSchedule::new(rounds).final_side();

        let before = t.alive_words().to_vec();
        t.round(side, Mode::Trim);
        prop_assert_eq!(t.alive_words(), &before[..]);
    }
}

// Property: a chunk plan partitions the item range for any chunk size
proptest! {
    #[test]
    fn prop_chunk_plan_partitions_range(
        total in 1u64..100_000,
        chunk_size in 1u64..5_000,
    ) {
        let plan = ChunkPlan::new(total, chunk_size);
        let mut next = 0u64;
        for chunk in plan.chunks() {
            prop_assert_eq!(chunk.base, next);
            prop_assert!(chunk.len >= 1);
            prop_assert!(chunk.len <= chunk_size);
            next = chunk.base + chunk.len;
        }
        prop_assert_eq!(next, total);
        prop_assert_eq!(plan.num_chunks(), total.div_ceil(chunk_size));
    }
}

// Helper: arbitrary SipHash keys
fn prop_keys() -> impl Strategy<Value = SipKeys> {
    (any::<u64>(), any::<u64>(), any::<u64>(), any::<u64>())
        .prop_map(|(k0, k1, k2, k3)| SipKeys { k0, k1, k2, k3 })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_survivor_indices_stay_in_edge_space() {
        let mut t = trimmer(10, SipKeys::TEST_HEADER);
        let result = t.run(6);
        assert!(result.survivors.iter().all(|&e| e < 1 << 10));
    }

    #[test]
    fn test_extract_agrees_with_trim_on_alive_bits() {
        // Two identical trimmers, one extracting, one only trimming: the
        // alive bitmaps must come out identical.
        let mut extracting = trimmer(10, SipKeys::TEST_HEADER);
        let mut trimming = trimmer(10, SipKeys::TEST_HEADER);

        for round in RoundSchedule::new(4).rounds() {
            extracting.round(round.side, round.update_mode);
            trimming.round(round.side, Mode::Trim);
        }
        assert_eq!(extracting.alive_words(), trimming.alive_words());
    }

    #[test]
    fn test_first_round_kills_most_random_edges() {
        // With 2^10 random edges over 2^10 nodes per side, roughly 1/e of
        // nodes hold exactly one edge; the first round must remove a
        // nontrivial share but never grow the set.
        let mut t = trimmer(10, SipKeys::TEST_HEADER);
        t.round(Side::U, Mode::Trim);
        let alive = t.alive_count();
        assert!(alive < 1 << 10);
        assert!(alive > 0, "a random graph should not trim to nothing in one round");
    }
}
