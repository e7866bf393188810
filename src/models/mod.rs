//! Data structures for Popdarts: players, darts, rounds, match state, brackets.

mod bracket;
mod dart;
mod match_state;
mod player;
mod preferences;
mod round;
mod shot;

pub use bracket::{
    BracketError, BracketMatch, MatchId, Slot, TournamentBracket, TournamentId,
    MAX_BRACKET_PLAYERS, MIN_BRACKET_PLAYERS,
};
pub use dart::{ClosestSelection, Dart, DartError, DartRef, DartStatus, RoundDarts, DARTS_PER_PLAYER};
pub use match_state::{MatchError, MatchState, MatchSummary, WINNING_SCORE};
pub use player::{Player, PlayerId, Side};
pub use preferences::{InputMode, Preferences};
pub use round::{Round, RoundSummary};
pub use shot::{CapGroup, SpecialtyShot, CLOSEST_ORDINARY_POINTS, ORDINARY_POINTS};
