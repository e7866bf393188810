//! Round ledger: append rounds, replace the last one, and rebuild totals from history.

use crate::logic::scoring::{net_result, score_round};
use crate::models::{MatchError, MatchState, Round, RoundDarts, Side, WINNING_SCORE};
use chrono::Utc;

/// Score `darts` into a round record. Nothing is applied to match state.
pub fn build_round(round_number: u32, darts: RoundDarts, first_thrower: Side) -> Round {
    let points = score_round(&darts);
    let net = net_result(points);
    Round {
        round_number,
        player1_darts_landed: darts.landed_count(Side::One),
        player2_darts_landed: darts.landed_count(Side::Two),
        player1_points: points.player1,
        player2_points: points.player2,
        winner: net.winner,
        first_thrower,
        darts,
        recorded_at: Utc::now(),
        edited_at: None,
    }
}

/// Who throws first after `round`: the winner; on a wash the same player,
/// except that a no-throw wash hands first throw to the other player.
pub fn first_thrower_after(round: &Round) -> Side {
    match round.winner {
        Some(winner) => winner,
        None if round.is_no_throw() => round.first_thrower.other(),
        None => round.first_thrower,
    }
}

/// Credit the round winner with the net score, clamped to the winning score.
fn apply_net(state: &mut MatchState, round: &Round) {
    let Some(winner) = round.winner else {
        return;
    };
    let net = round.net_score();
    match winner {
        Side::One => {
            state.player1_score = (state.player1_score + net).min(WINNING_SCORE);
            state.player1_rounds_won += 1;
        }
        Side::Two => {
            state.player2_score = (state.player2_score + net).min(WINNING_SCORE);
            state.player2_rounds_won += 1;
        }
    }
}

/// Push a completed round and update totals, rounds won, first thrower and round number.
pub fn append_round(state: &mut MatchState, round: Round) {
    apply_net(state, &round);
    state.first_thrower = first_thrower_after(&round);
    state.current_round_number = round.round_number + 1;
    log::info!(
        "Round {} recorded: {}-{} (winner {}), totals {}-{}",
        round.round_number,
        round.player1_points,
        round.player2_points,
        round.winner_code(),
        state.player1_score,
        state.player2_score
    );
    state.round_history.push(round);
}

/// Rebuild both scores and both rounds-won counters by replaying the whole history from zero.
pub fn recompute_totals(state: &mut MatchState) {
    state.player1_score = 0;
    state.player2_score = 0;
    state.player1_rounds_won = 0;
    state.player2_rounds_won = 0;
    let history = std::mem::take(&mut state.round_history);
    for round in &history {
        apply_net(state, round);
    }
    state.round_history = history;
}

/// Replace the most recent round and recompute every derived total.
/// Returns the round that was replaced.
pub fn replace_last_round(state: &mut MatchState, mut round: Round) -> Result<Round, MatchError> {
    let last = state
        .round_history
        .last_mut()
        .ok_or(MatchError::NoRoundToEdit)?;
    round.round_number = last.round_number;
    round.first_thrower = last.first_thrower;
    round.recorded_at = last.recorded_at;
    round.edited_at = Some(Utc::now());
    let previous = std::mem::replace(last, round);

    recompute_totals(state);
    if let Some(edited) = state.round_history.last() {
        state.first_thrower = first_thrower_after(edited);
        log::info!(
            "Round {} edited: winner {} -> {}, totals {}-{}",
            edited.round_number,
            previous.winner_code(),
            edited.winner_code(),
            state.player1_score,
            state.player2_score
        );
    }
    Ok(previous)
}
