//! Cumulative match state, the completion summary, and match errors.

use crate::models::dart::DartError;
use crate::models::player::Side;
use crate::models::round::Round;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// First cumulative score to reach this wins; scores are clamped to it.
pub const WINNING_SCORE: u32 = 21;

/// Errors that can occur while playing a match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchError {
    /// Both players need a name before the match starts.
    MissingPlayerName(Side),
    /// A winner has been declared; reset to play again.
    MatchOver,
    /// Both players landed darts but nobody was marked closest.
    ClosestRequired,
    /// The closest player has no landed dart this round.
    ClosestHasNoLandedDart(Side),
    /// A player has not resolved any of their darts.
    UnresolvedDarts(Side),
    /// There is no previous round to edit.
    NoRoundToEdit,
    Dart(DartError),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::MissingPlayerName(side) => {
                write!(f, "Player {} needs a name", side.number())
            }
            MatchError::MatchOver => write!(f, "Match is over"),
            MatchError::ClosestRequired => write!(f, "Select the closest player"),
            MatchError::ClosestHasNoLandedDart(side) => write!(
                f,
                "Player {} is marked closest but has no landed dart",
                side.number()
            ),
            MatchError::UnresolvedDarts(side) => {
                write!(f, "Player {} has not resolved any darts", side.number())
            }
            MatchError::NoRoundToEdit => write!(f, "No previous round to edit"),
            MatchError::Dart(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<DartError> for MatchError {
    fn from(e: DartError) -> Self {
        MatchError::Dart(e)
    }
}

/// Scores, history and throw order for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub player1_score: u32,
    pub player2_score: u32,
    pub round_history: Vec<Round>,
    /// Number the next round will get.
    pub current_round_number: u32,
    /// Who throws first in the next round.
    pub first_thrower: Side,
    pub player1_rounds_won: u32,
    pub player2_rounds_won: u32,
}

impl MatchState {
    pub fn new(first_thrower: Side) -> Self {
        Self {
            player1_score: 0,
            player2_score: 0,
            round_history: Vec::new(),
            current_round_number: 1,
            first_thrower,
            player1_rounds_won: 0,
            player2_rounds_won: 0,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::One => self.player1_score,
            Side::Two => self.player2_score,
        }
    }

    pub fn rounds_won(&self, side: Side) -> u32 {
        match side {
            Side::One => self.player1_rounds_won,
            Side::Two => self.player2_rounds_won,
        }
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.round_history.last()
    }

    /// Side whose cumulative score has reached the winning score.
    pub fn winner(&self) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.score(side) >= WINNING_SCORE)
    }
}

/// Emitted once a match has a winner (summary view and persistence hook).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner: Side,
    pub winner_name: String,
    pub player1_score: u32,
    pub player2_score: u32,
    pub player1_rounds_won: u32,
    pub player2_rounds_won: u32,
    pub round_history: Vec<Round>,
    pub finished_at: DateTime<Utc>,
}
