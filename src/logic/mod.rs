//! Popdarts business logic: round scoring, the round ledger, match flow, brackets.

mod bracket_advancer;
mod bracket_builder;
mod ledger;
mod match_play;
mod scoring;

pub use bracket_advancer::{
    complete_match, pause_match, playable_matches, resume_match, start_match, Advancement,
};
pub use bracket_builder::{generate_bracket, start_tournament};
pub use ledger::{append_round, build_round, first_thrower_after, recompute_totals, replace_last_round};
pub use match_play::{MatchController, Submission};
pub use scoring::{dart_points, net_result, score_round, NetResult, RoundPoints};
