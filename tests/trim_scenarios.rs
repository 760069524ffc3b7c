//! End-to-end trimming scenarios on hand-built graphs.
//!
//! These run on the serial reference model, whose buffer semantics are
//! kernel-identical, so they pin the algorithm itself: what must be
//! pruned, what must survive, and how many rounds convergence takes.

use std::collections::HashMap;

use cuckatoo_lean::trim::{Mode, NodeHasher, ReferenceTrimmer, RoundSchedule, Side, TrimResult};

const NUM_EDGES: u32 = 1 << 10;

/// Hasher backed by explicit endpoint tables.
struct TableHasher {
    u: Vec<u32>,
    v: Vec<u32>,
}

impl NodeHasher for TableHasher {
    fn node(&self, edge: u32, side: Side) -> u32 {
        match side {
            Side::U => self.u[edge as usize],
            Side::V => self.v[edge as usize],
        }
    }
}

/// Every survivor's endpoint on the extraction side must be shared with
/// at least one other survivor.
fn assert_no_false_survivors<H: NodeHasher>(result: &TrimResult, hasher: &H) {
    let mut incidence: HashMap<u32, u32> = HashMap::new();
    for &edge in &result.survivors {
        *incidence.entry(hasher.node(edge, result.side)).or_insert(0) += 1;
    }
    for &edge in &result.survivors {
        let node = hasher.node(edge, result.side);
        assert!(
            incidence[&node] >= 2,
            "edge {edge} survived with degree-1 endpoint {node}"
        );
    }
}

#[test]
fn scenario_all_isolated_edges_prune_in_one_round() {
    // Every edge gets a unique node pair: all degrees are 1.
    let hasher = TableHasher {
        u: (0..NUM_EDGES).collect(),
        v: (0..NUM_EDGES).collect(),
    };
    let mut t = ReferenceTrimmer::new(NUM_EDGES, hasher);

    let result = t.run(1);
    assert_eq!(result.count, 0);
    assert!(result.survivors.is_empty());
    assert_eq!(t.alive_count(), 0);
}

#[test]
fn scenario_dense_cluster_survives_all_rounds() {
    // Two node ids per side: every node holds half the edges, so no
    // degree ever drops below 2 and nothing is ever pruned.
    let hasher = TableHasher {
        u: (0..NUM_EDGES).map(|e| e & 1).collect(),
        v: (0..NUM_EDGES).map(|e| (e >> 1) & 1).collect(),
    };
    let mut t = ReferenceTrimmer::new(NUM_EDGES, hasher);

    let result = t.run(60);
    assert_eq!(result.count, NUM_EDGES);
    assert_eq!(result.sorted_survivors(), (0..NUM_EDGES).collect::<Vec<_>>());
}

/// Edges 0..8 form an 8-cycle over U-nodes {0..3} and V-nodes {0..3};
/// edges 8..11 are a chain hanging off cycle node U0 that unravels one
/// link per round; everything else is isolated.
fn cycle_with_pendants() -> TableHasher {
    let mut u: Vec<u32> = (0..NUM_EDGES).collect();
    let mut v: Vec<u32> = (0..NUM_EDGES).collect();

    // U0-V0-U1-V1-U2-V2-U3-V3-U0: every cycle node has degree 2.
    let cycle_u = [0u32, 1, 1, 2, 2, 3, 3, 0];
    let cycle_v = [0u32, 0, 1, 1, 2, 2, 3, 3];
    u[..8].copy_from_slice(&cycle_u);
    v[..8].copy_from_slice(&cycle_v);

    // Chain: U0 -(8)- V4 -(9)- U4 -(10)- V5.
    u[8] = 0;
    v[8] = 4;
    u[9] = 4;
    v[9] = 4;
    u[10] = 4;
    v[10] = 5;

    TableHasher { u, v }
}

#[test]
fn scenario_cycle_survives_pendant_chain_unravels() {
    let mut t = ReferenceTrimmer::new(NUM_EDGES, cycle_with_pendants());

    let result = t.run(8);
    assert_eq!(result.count, 8);
    assert_eq!(result.sorted_survivors(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_no_false_survivors(&result, &cycle_with_pendants());
}

#[test]
fn scenario_pendant_chain_unravels_one_link_per_round() {
    let mut t = ReferenceTrimmer::new(NUM_EDGES, cycle_with_pendants());

    // Round 0 (U side): isolated edges die, the chain holds.
    t.round(Side::U, Mode::Trim);
    assert!(t.is_alive(8) && t.is_alive(9) && t.is_alive(10));
    assert_eq!(t.alive_count(), 11);

    // Round 1 (V side): V5 has degree 1, edge 10 dies.
    t.round(Side::V, Mode::Trim);
    assert!(!t.is_alive(10));
    assert!(t.is_alive(8) && t.is_alive(9));

    // Round 2 (U side): U4 dropped to degree 1, edge 9 dies.
    t.round(Side::U, Mode::Trim);
    assert!(!t.is_alive(9));
    assert!(t.is_alive(8));

    // Round 3 (V side): V4 dropped to degree 1, edge 8 dies.
    t.round(Side::V, Mode::Trim);
    assert!(!t.is_alive(8));

    // Only the cycle remains, and it is stable.
    assert_eq!(t.alive_edges(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    t.round(Side::U, Mode::Trim);
    t.round(Side::V, Mode::Trim);
    assert_eq!(t.alive_edges(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn scenario_survivors_identical_across_round_counts_past_convergence() {
    // Once stable, extra rounds only re-confirm the fixed point.
    let result_short = ReferenceTrimmer::new(NUM_EDGES, cycle_with_pendants()).run(8);
    let result_long = ReferenceTrimmer::new(NUM_EDGES, cycle_with_pendants()).run(20);
    assert_eq!(result_short.sorted_survivors(), result_long.sorted_survivors());
}

#[test]
fn scenario_reported_count_matches_list_length() {
    for rounds in [1, 2, 5, 8] {
        let result = ReferenceTrimmer::new(NUM_EDGES, cycle_with_pendants()).run(rounds);
        assert_eq!(result.count as usize, result.survivors.len());
    }
}

#[test]
fn schedule_alternates_and_extracts_last() {
    let schedule = RoundSchedule::new(8);
    let rounds: Vec<_> = schedule.rounds().collect();
    assert_eq!(rounds[0].side, Side::U);
    assert_eq!(rounds[7].side, Side::V);
    assert!(rounds[..7].iter().all(|r| r.update_mode == Mode::Trim));
    assert_eq!(rounds[7].update_mode, Mode::Extract);
}
