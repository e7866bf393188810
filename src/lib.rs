//! Popdarts scorer: library with models and business logic.
//!
//! Two cores: round scoring with cancellation and retroactive edits of the
//! last round, and single-elimination brackets with byes.

pub mod logic;
pub mod models;

pub use logic::{
    append_round, build_round, complete_match, dart_points, first_thrower_after, generate_bracket,
    net_result, pause_match, playable_matches, recompute_totals, replace_last_round, resume_match,
    score_round, start_match, start_tournament, Advancement, MatchController, NetResult,
    RoundPoints, Submission,
};
pub use models::{
    BracketError, BracketMatch, CapGroup, ClosestSelection, Dart, DartError, DartRef, DartStatus,
    InputMode, MatchError, MatchId, MatchState, MatchSummary, Player, PlayerId, Preferences,
    Round, RoundDarts, RoundSummary, Side, Slot, SpecialtyShot, TournamentBracket, TournamentId,
    CLOSEST_ORDINARY_POINTS, DARTS_PER_PLAYER, MAX_BRACKET_PLAYERS, MIN_BRACKET_PLAYERS,
    ORDINARY_POINTS, WINNING_SCORE,
};
