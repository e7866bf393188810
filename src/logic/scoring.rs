//! Round scoring: per-dart values, closest bonus suppression, and cancellation.
//!
//! Input is assumed to satisfy the `RoundDarts` invariants; nothing here re-validates.

use crate::models::{
    DartRef, RoundDarts, Side, SpecialtyShot, CLOSEST_ORDINARY_POINTS, ORDINARY_POINTS,
};
use serde::{Deserialize, Serialize};

/// Raw round points per player, before cancellation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundPoints {
    pub player1: u32,
    pub player2: u32,
}

impl RoundPoints {
    pub fn for_side(&self, side: Side) -> u32 {
        match side {
            Side::One => self.player1,
            Side::Two => self.player2,
        }
    }
}

/// Outcome of cancellation scoring: only the difference counts, and only for the winner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetResult {
    /// None on a tie (wash).
    pub winner: Option<Side>,
    pub net_score: u32,
}

/// Round-wide facts every dart value depends on.
struct RoundContext<'a> {
    darts: &'a RoundDarts,
    closest: Option<Side>,
    /// A T-Nobber or Inch Worm anywhere cancels every closest bonus.
    bonus_suppressed: bool,
    /// A Lippy anywhere cancels the ordinary-dart closest bonus.
    lippy_in_round: bool,
}

impl<'a> RoundContext<'a> {
    fn new(darts: &'a RoundDarts) -> Self {
        let bonus_suppressed = darts
            .iter()
            .any(|(_, d)| d.shot.is_some_and(SpecialtyShot::suppresses_closest_bonus));
        Self {
            darts,
            closest: darts.closest_side(),
            bonus_suppressed,
            lippy_in_round: darts.has_shot(SpecialtyShot::Lippy),
        }
    }

    fn first_ordinary(&self, side: Side) -> Option<usize> {
        self.darts.darts(side).iter().position(|d| d.is_ordinary())
    }

    fn value(&self, at: DartRef) -> u32 {
        let Some(dart) = self.darts.dart(at) else {
            return 0;
        };
        if !dart.is_landed() {
            return 0;
        }
        let is_closest = self.closest == Some(at.side);
        match dart.shot {
            None => {
                let bonus = is_closest
                    && !self.bonus_suppressed
                    && !self.lippy_in_round
                    && self.first_ordinary(at.side) == Some(at.index);
                if bonus {
                    CLOSEST_ORDINARY_POINTS
                } else {
                    ORDINARY_POINTS
                }
            }
            Some(SpecialtyShot::WiggleNobber) => match dart.target {
                // Targets are never wiggle nobbers themselves, so this recurses once.
                Some(target) if target != at => 2 * self.value(target),
                _ => 0,
            },
            Some(shot) => match shot.closest_points() {
                Some(bonus) if is_closest && !self.bonus_suppressed => bonus,
                _ => shot.base_points(),
            },
        }
    }
}

/// Points a single dart contributes to its thrower this round.
pub fn dart_points(darts: &RoundDarts, at: DartRef) -> u32 {
    RoundContext::new(darts).value(at)
}

/// Raw points for both players.
pub fn score_round(darts: &RoundDarts) -> RoundPoints {
    let ctx = RoundContext::new(darts);
    let total = |side: Side| -> u32 {
        (0..darts.darts(side).len())
            .map(|index| ctx.value(DartRef::new(side, index)))
            .sum()
    };
    RoundPoints {
        player1: total(Side::One),
        player2: total(Side::Two),
    }
}

/// Apply cancellation: the higher total wins by the difference; equal totals are a wash.
pub fn net_result(points: RoundPoints) -> NetResult {
    let winner = match points.player1.cmp(&points.player2) {
        std::cmp::Ordering::Greater => Some(Side::One),
        std::cmp::Ordering::Less => Some(Side::Two),
        std::cmp::Ordering::Equal => None,
    };
    NetResult {
        winner,
        net_score: points.player1.abs_diff(points.player2),
    }
}
