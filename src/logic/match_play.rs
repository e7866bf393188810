//! Match controller: dart input, round submission and edits, win detection, rematch.

use crate::logic::ledger::{append_round, build_round, replace_last_round};
use crate::logic::scoring::{net_result, score_round};
use crate::models::{
    ClosestSelection, DartRef, DartStatus, InputMode, MatchError, MatchState, MatchSummary,
    Player, RoundDarts, RoundSummary, Side, SpecialtyShot,
};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

/// Result of submitting or editing a round.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Submission {
    /// Nobody landed a dart; resubmit with confirmation to record a wash.
    WashConfirmationRequired,
    Recorded {
        round: RoundSummary,
        /// Set when this round decided the match.
        completed: Option<MatchSummary>,
    },
}

/// A validated round ready to be scored.
enum Prepared {
    NeedsConfirmation,
    Ready(RoundDarts),
}

/// One match between two players.
#[derive(Clone, Debug, Serialize)]
pub struct MatchController {
    pub player1: Player,
    pub player2: Player,
    pub mode: InputMode,
    pub state: MatchState,
    /// Darts of the round being entered.
    pub current: RoundDarts,
    pub winner: Option<Side>,
}

impl MatchController {
    /// Start a match. Both players need a non-blank name.
    pub fn new(
        player1: Player,
        player2: Player,
        mode: InputMode,
        first_thrower: Side,
    ) -> Result<Self, MatchError> {
        Self::resume(player1, player2, mode, MatchState::new(first_thrower))
    }

    /// Start a match with the first thrower picked by coin flip.
    pub fn with_coin_flip<R: Rng + ?Sized>(
        player1: Player,
        player2: Player,
        mode: InputMode,
        rng: &mut R,
    ) -> Result<Self, MatchError> {
        let first_thrower = if rng.gen_bool(0.5) { Side::One } else { Side::Two };
        Self::new(player1, player2, mode, first_thrower)
    }

    /// Rebuild a live match from a stored state (e.g. a paused bracket match).
    pub fn resume(
        player1: Player,
        player2: Player,
        mode: InputMode,
        state: MatchState,
    ) -> Result<Self, MatchError> {
        if !player1.has_name() {
            return Err(MatchError::MissingPlayerName(Side::One));
        }
        if !player2.has_name() {
            return Err(MatchError::MissingPlayerName(Side::Two));
        }
        let winner = state.winner();
        Ok(Self {
            player1,
            player2,
            mode,
            state,
            current: RoundDarts::new(),
            winner,
        })
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::One => &self.player1,
            Side::Two => &self.player2,
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    fn ensure_open(&self) -> Result<(), MatchError> {
        if self.is_over() {
            return Err(MatchError::MatchOver);
        }
        Ok(())
    }

    pub fn tap_dart(&mut self, at: DartRef) -> Result<(), MatchError> {
        self.ensure_open()?;
        self.current.tap(at, self.mode)?;
        Ok(())
    }

    pub fn set_status(&mut self, at: DartRef, status: DartStatus) -> Result<(), MatchError> {
        self.ensure_open()?;
        self.current.set_status(at, status)?;
        Ok(())
    }

    pub fn set_shot(
        &mut self,
        at: DartRef,
        shot: Option<SpecialtyShot>,
        target: Option<DartRef>,
    ) -> Result<(), MatchError> {
        self.ensure_open()?;
        self.current.set_shot(at, shot, target)?;
        Ok(())
    }

    /// In casual mode the pick is per player, so any pinned dart is dropped.
    pub fn set_closest(&mut self, selection: Option<ClosestSelection>) -> Result<(), MatchError> {
        self.ensure_open()?;
        self.current.set_closest(self.closest_for_mode(selection))?;
        Ok(())
    }

    fn closest_for_mode(&self, selection: Option<ClosestSelection>) -> Option<ClosestSelection> {
        match self.mode {
            InputMode::Casual => selection.map(|s| ClosestSelection::player(s.side)),
            InputMode::Advanced => selection,
        }
    }

    /// Abandon the round being entered. Recorded state is untouched.
    pub fn discard_round(&mut self) {
        self.current = RoundDarts::new();
    }

    /// Score the round being entered without recording it.
    pub fn preview(&self) -> Result<RoundSummary, MatchError> {
        let darts = match prepare(&self.current, true)? {
            Prepared::Ready(darts) => darts,
            Prepared::NeedsConfirmation => RoundDarts::all_missed(),
        };
        let points = score_round(&darts);
        let net = net_result(points);
        Ok(RoundSummary {
            round_number: self.state.current_round_number,
            player1_darts: *darts.darts(Side::One),
            player2_darts: *darts.darts(Side::Two),
            player1_points: points.player1,
            player2_points: points.player2,
            net_score: net.net_score,
            winner: net.winner,
        })
    }

    /// Record the round being entered.
    pub fn submit_round(&mut self, confirm_wash: bool) -> Result<Submission, MatchError> {
        self.ensure_open()?;
        let darts = match prepare(&self.current, confirm_wash)? {
            Prepared::NeedsConfirmation => return Ok(Submission::WashConfirmationRequired),
            Prepared::Ready(darts) => darts,
        };
        let round = build_round(self.state.current_round_number, darts, self.state.first_thrower);
        let summary = round.summary();
        append_round(&mut self.state, round);
        self.current = RoundDarts::new();
        Ok(self.recorded(summary))
    }

    /// Darts of the previous round, to load into an edit buffer.
    pub fn last_round_darts(&self) -> Option<RoundDarts> {
        self.state.last_round().map(|r| r.darts.clone())
    }

    /// Replace the previous round with re-entered darts and rebuild all totals.
    /// Allowed after the match is decided; the winner is re-evaluated.
    pub fn edit_last_round(
        &mut self,
        mut darts: RoundDarts,
        confirm_wash: bool,
    ) -> Result<Submission, MatchError> {
        let Some(last) = self.state.last_round() else {
            return Err(MatchError::NoRoundToEdit);
        };
        let (number, first_thrower) = (last.round_number, last.first_thrower);
        if self.mode == InputMode::Casual {
            darts.set_closest(self.closest_for_mode(darts.closest()))?;
        }
        let darts = match prepare(&darts, confirm_wash)? {
            Prepared::NeedsConfirmation => return Ok(Submission::WashConfirmationRequired),
            Prepared::Ready(darts) => darts,
        };
        let round = build_round(number, darts, first_thrower);
        let summary = round.summary();
        replace_last_round(&mut self.state, round)?;
        Ok(self.recorded(summary))
    }

    /// Clear scores and history for a rematch between the same players.
    pub fn reset_match(&mut self, first_thrower: Side) {
        self.state = MatchState::new(first_thrower);
        self.current = RoundDarts::new();
        self.winner = None;
        log::info!(
            "Match reset: {} vs {}",
            self.player1.name,
            self.player2.name
        );
    }

    pub fn summary(&self) -> Option<MatchSummary> {
        let winner = self.winner?;
        Some(MatchSummary {
            winner,
            winner_name: self.player(winner).name.clone(),
            player1_score: self.state.player1_score,
            player2_score: self.state.player2_score,
            player1_rounds_won: self.state.player1_rounds_won,
            player2_rounds_won: self.state.player2_rounds_won,
            round_history: self.state.round_history.clone(),
            finished_at: Utc::now(),
        })
    }

    fn recorded(&mut self, round: RoundSummary) -> Submission {
        let was_over = self.winner.is_some();
        self.winner = self.state.winner();
        let completed = self.summary();
        if let Some(summary) = &completed {
            if !was_over {
                log::info!(
                    "Match won by {} ({}-{})",
                    summary.winner_name,
                    summary.player1_score,
                    summary.player2_score
                );
            }
        }
        Submission::Recorded { round, completed }
    }
}

/// Validate a round's darts for submission.
///
/// Zero landed darts needs wash confirmation and is then recorded as all
/// missed. If only one player landed and nobody is marked closest, that
/// player is closest.
fn prepare(darts: &RoundDarts, confirm_wash: bool) -> Result<Prepared, MatchError> {
    darts.validate()?;
    if darts.total_landed() == 0 {
        if !confirm_wash {
            return Ok(Prepared::NeedsConfirmation);
        }
        return Ok(Prepared::Ready(RoundDarts::all_missed()));
    }

    for side in Side::BOTH {
        if darts.resolved_count(side) == 0 {
            return Err(MatchError::UnresolvedDarts(side));
        }
    }

    let landed = |side: Side| darts.landed_count(side) > 0;
    let mut ready = darts.clone();
    match ready.closest_side() {
        Some(side) if !landed(side) => return Err(MatchError::ClosestHasNoLandedDart(side)),
        Some(_) => {}
        None if landed(Side::One) && landed(Side::Two) => return Err(MatchError::ClosestRequired),
        None => {
            let only = if landed(Side::One) { Side::One } else { Side::Two };
            ready.set_closest(Some(ClosestSelection::player(only)))?;
        }
    }
    Ok(Prepared::Ready(ready))
}
