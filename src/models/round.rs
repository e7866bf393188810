//! Recorded rounds and the summary shown before a round is committed.

use crate::models::dart::{ClosestSelection, Dart, RoundDarts, DARTS_PER_PLAYER};
use crate::models::player::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed round. Only replaced through an explicit edit of the last round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub darts: RoundDarts,
    pub player1_darts_landed: usize,
    pub player2_darts_landed: usize,
    /// Points before cancellation; the stored value is never clamped.
    pub player1_points: u32,
    pub player2_points: u32,
    /// None for a wash.
    pub winner: Option<Side>,
    pub first_thrower: Side,
    pub recorded_at: DateTime<Utc>,
    /// Set when the round was replaced by an edit.
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn points(&self, side: Side) -> u32 {
        match side {
            Side::One => self.player1_points,
            Side::Two => self.player2_points,
        }
    }

    pub fn darts_landed(&self, side: Side) -> usize {
        match side {
            Side::One => self.player1_darts_landed,
            Side::Two => self.player2_darts_landed,
        }
    }

    pub fn closest(&self) -> Option<ClosestSelection> {
        self.darts.closest()
    }

    pub fn net_score(&self) -> u32 {
        self.player1_points.abs_diff(self.player2_points)
    }

    /// 0 for a wash, otherwise the winning player's number.
    pub fn winner_code(&self) -> u8 {
        self.winner.map_or(0, Side::number)
    }

    /// Nobody landed a dart: the round was recorded through wash confirmation.
    pub fn is_no_throw(&self) -> bool {
        self.player1_darts_landed + self.player2_darts_landed == 0
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round_number: self.round_number,
            player1_darts: *self.darts.darts(Side::One),
            player2_darts: *self.darts.darts(Side::Two),
            player1_points: self.player1_points,
            player2_points: self.player2_points,
            net_score: self.net_score(),
            winner: self.winner,
        }
    }
}

/// Round result for display, before or after it is committed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub player1_darts: [Dart; DARTS_PER_PLAYER],
    pub player2_darts: [Dart; DARTS_PER_PLAYER],
    pub player1_points: u32,
    pub player2_points: u32,
    pub net_score: u32,
    pub winner: Option<Side>,
}
