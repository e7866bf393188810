//! Bracket progression: start, pause, resume and complete matches; propagate winners.

use crate::models::{
    BracketError, BracketMatch, MatchId, MatchState, Player, Side, Slot, TournamentBracket,
};
use serde::Serialize;

/// What completing a match led to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advancement {
    /// Winner was written into a slot of the next-round match.
    Advanced { next_match: MatchId },
    /// The final was decided.
    Champion { player: Player },
}

/// Mark a match as in progress and return its players.
///
/// A no-op (`None`) when the match is unknown, completed, missing a player,
/// paused (use [`resume_match`]), or any match (this one included) is
/// already in progress.
pub fn start_match(bracket: &mut TournamentBracket, match_id: MatchId) -> Option<(Player, Player)> {
    if let Some(active) = bracket.active_match {
        log::debug!("start ignored: match {} is already in progress", active);
        return None;
    }
    let m = bracket.find_match(match_id)?;
    if !m.is_playable() {
        log::debug!("start ignored: match {} is not playable", match_id);
        return None;
    }
    if m.is_paused() {
        log::debug!("start ignored: match {} is paused, resume it instead", match_id);
        return None;
    }
    let (p1, p2) = m.players()?;
    let players = (p1.clone(), p2.clone());
    bracket.active_match = Some(match_id);
    log::info!("Bracket match started: {} vs {}", players.0.name, players.1.name);
    Some(players)
}

/// Store a live match snapshot without completing the match.
///
/// Only the match in progress (or an idle one while nothing is in progress)
/// can be paused.
pub fn pause_match(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
    current: &MatchState,
) -> Result<(), BracketError> {
    if let Some(active) = bracket.active_match.filter(|&active| active != match_id) {
        return Err(BracketError::AnotherMatchInProgress(active));
    }
    if let Some(other) = bracket.paused_match().filter(|m| m.id != match_id) {
        return Err(BracketError::AnotherMatchPaused(other.id));
    }
    let m = playable_mut(bracket, match_id)?;
    m.player1_score = current.player1_score;
    m.player2_score = current.player2_score;
    m.paused_scores = Some(current.clone());
    if bracket.active_match == Some(match_id) {
        bracket.active_match = None;
    }
    log::info!(
        "Bracket match paused at {}-{}",
        current.player1_score,
        current.player2_score
    );
    Ok(())
}

/// Take the paused snapshot back out so play can continue.
pub fn resume_match(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
) -> Result<MatchState, BracketError> {
    if let Some(active) = bracket.active_match.filter(|&active| active != match_id) {
        return Err(BracketError::AnotherMatchInProgress(active));
    }
    let m = playable_mut(bracket, match_id)?;
    let state = m
        .paused_scores
        .take()
        .ok_or(BracketError::NotPaused(match_id))?;
    bracket.active_match = Some(match_id);
    log::info!("Bracket match resumed at round {}", state.current_round_number);
    Ok(state)
}

/// Record a result and move the winner on.
///
/// `winner` names the slot that won. If a next-round match lists this match as
/// a source, the winner fills the matching slot; after the final the winner is
/// the champion.
pub fn complete_match(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
    winner: Side,
    scores: (u32, u32),
) -> Result<Advancement, BracketError> {
    let total_rounds = bracket.total_rounds;
    let m = playable_mut(bracket, match_id)?;
    let champion = m
        .slot(winner)
        .player()
        .cloned()
        .ok_or(BracketError::SlotsNotFilled(match_id))?;
    m.completed = true;
    m.player1_score = scores.0;
    m.player2_score = scores.1;
    m.winner = Some(champion.clone());
    m.paused_scores = None;
    let round = m.round;

    if bracket.active_match == Some(match_id) {
        bracket.active_match = None;
    }
    log::info!(
        "Bracket match completed: {} wins {}-{} (round {})",
        champion.name,
        scores.0,
        scores.1,
        round
    );

    if round >= total_rounds {
        log::info!("Tournament champion: {}", champion.name);
        bracket.champion = Some(champion.clone());
        return Ok(Advancement::Champion { player: champion });
    }

    let next_round = bracket
        .rounds
        .get_mut(round as usize)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    for next in next_round.iter_mut() {
        let side = if next.source_match1_id == Some(match_id) {
            Side::One
        } else if next.source_match2_id == Some(match_id) {
            Side::Two
        } else {
            continue;
        };
        *next.slot_mut(side) = Slot::Player(champion);
        return Ok(Advancement::Advanced {
            next_match: next.id,
        });
    }
    Err(BracketError::MatchNotFound(match_id))
}

/// Matches that can be started now, in round order.
pub fn playable_matches(bracket: &TournamentBracket) -> Vec<&BracketMatch> {
    bracket.matches().filter(|m| m.is_playable()).collect()
}

/// Look up a match that is not completed and has both players.
fn playable_mut(
    bracket: &mut TournamentBracket,
    match_id: MatchId,
) -> Result<&mut BracketMatch, BracketError> {
    let m = bracket
        .find_match_mut(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    if m.completed {
        return Err(BracketError::MatchAlreadyCompleted(match_id));
    }
    if m.players().is_none() {
        return Err(BracketError::SlotsNotFilled(match_id));
    }
    Ok(m)
}
