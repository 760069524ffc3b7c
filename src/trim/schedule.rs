//! Round and phase schedule for lean trimming.
//!
//! A trimming run is a fixed number of rounds. Every round counts node
//! degrees on one endpoint side, then prunes the degree-1 edges on that
//! side; the final round extracts survivors instead of merely pruning.
//! Sides alternate between rounds: removing a U-side degree-1 edge changes
//! V-side degrees and vice versa, so convergence requires interleaving.

/// Kernel phase selector.
///
/// The discriminants are the wire values passed to the compute kernel and
/// must not change.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Count alive-edge degrees into the node counters.
    SetCount = 1,
    /// Clear the alive bit of every edge whose counted endpoint has
    /// degree 1.
    Trim = 2,
    /// Same pruning rule as [`Mode::Trim`], but surviving edges are
    /// appended to the survivor list.
    Extract = 3,
}

impl Mode {
    /// Wire value shared with the compute kernel.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Which endpoint of an edge a round counts and prunes on.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The U-side endpoint (`sipnode(edge, 0)`).
    U = 0,
    /// The V-side endpoint (`sipnode(edge, 1)`).
    V = 1,
}

impl Side {
    /// Side counted in round `round`: even rounds count U, odd rounds V.
    #[must_use]
    pub const fn of_round(round: u32) -> Self {
        if round & 1 == 0 {
            Self::U
        } else {
            Self::V
        }
    }

    /// Wire value shared with the compute kernel (0 or 1).
    #[must_use]
    pub const fn bit(self) -> u32 {
        self as u32
    }
}

/// One round of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    /// Round index in `0..rounds`.
    pub index: u32,
    /// Endpoint side counted and pruned this round.
    pub side: Side,
    /// Second-phase mode: [`Mode::Trim`], or [`Mode::Extract`] on the
    /// final round.
    pub update_mode: Mode,
}

/// The full per-run schedule of `(side, mode)` rounds.
///
/// # Example
///
/// ```
/// use cuckatoo_lean::trim::{Mode, RoundSchedule, Side};
///
/// let schedule = RoundSchedule::new(3);
/// let rounds: Vec<_> = schedule.rounds().collect();
/// assert_eq!(rounds[0].side, Side::U);
/// assert_eq!(rounds[1].side, Side::V);
/// assert_eq!(rounds[2].update_mode, Mode::Extract);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSchedule {
    rounds: u32,
}

impl RoundSchedule {
    /// Schedule for `rounds` trimming rounds (the last one extracts).
    #[must_use]
    pub const fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    /// Total number of rounds.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.rounds
    }

    /// Whether the schedule is empty (zero rounds).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rounds == 0
    }

    /// Side of the final (extracting) round; the survivor list lands in
    /// the aux buffer selected by this side.
    #[must_use]
    pub const fn final_side(&self) -> Side {
        Side::of_round(self.rounds.saturating_sub(1))
    }

    /// Iterate the rounds in run order.
    pub fn rounds(&self) -> impl Iterator<Item = Round> + '_ {
        let last = self.rounds.saturating_sub(1);
        (0..self.rounds).map(move |index| Round {
            index,
            side: Side::of_round(index),
            update_mode: if index == last {
                Mode::Extract
            } else {
                Mode::Trim
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_alternate() {
        let schedule = RoundSchedule::new(6);
        let sides: Vec<_> = schedule.rounds().map(|r| r.side).collect();
        assert_eq!(
            sides,
            vec![Side::U, Side::V, Side::U, Side::V, Side::U, Side::V]
        );
    }

    #[test]
    fn test_only_last_round_extracts() {
        let schedule = RoundSchedule::new(60);
        let rounds: Vec<_> = schedule.rounds().collect();
        assert_eq!(rounds.len(), 60);
        for round in &rounds[..59] {
            assert_eq!(round.update_mode, Mode::Trim);
        }
        assert_eq!(rounds[59].update_mode, Mode::Extract);
        assert_eq!(rounds[59].side, Side::V);
    }

    #[test]
    fn test_single_round_extracts_on_u() {
        let schedule = RoundSchedule::new(1);
        let rounds: Vec<_> = schedule.rounds().collect();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].side, Side::U);
        assert_eq!(rounds[0].update_mode, Mode::Extract);
        assert_eq!(schedule.final_side(), Side::U);
    }

    #[test]
    fn test_final_side_matches_last_round() {
        for rounds in 1..10 {
            let schedule = RoundSchedule::new(rounds);
            let last = schedule.rounds().last();
            assert_eq!(last.map(|r| r.side), Some(schedule.final_side()));
        }
    }

    #[test]
    fn test_mode_wire_values() {
        assert_eq!(Mode::SetCount.as_u32(), 1);
        assert_eq!(Mode::Trim.as_u32(), 2);
        assert_eq!(Mode::Extract.as_u32(), 3);
        assert_eq!(Side::U.bit(), 0);
        assert_eq!(Side::V.bit(), 1);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = RoundSchedule::new(0);
        assert!(schedule.is_empty());
        assert_eq!(schedule.rounds().count(), 0);
    }
}
