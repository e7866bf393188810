//! Integration tests for the match controller: validation, wash confirmation, edits, completion.

use popdarts_scorer::{
    ClosestSelection, DartRef, DartStatus, InputMode, MatchController, MatchError, Player,
    Preferences, RoundDarts, RoundSummary, Side, Submission, WINNING_SCORE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn at(side: Side, index: usize) -> DartRef {
    DartRef::new(side, index)
}

fn new_match(mode: InputMode) -> MatchController {
    MatchController::new(
        Player::new("Ada", "teal"),
        Player::new("Bo", "coral"),
        mode,
        Side::One,
    )
    .unwrap()
}

/// Enter a round where `winner` lands three darts as closest and the other player misses all.
fn enter_sweep(m: &mut MatchController, winner: Side) {
    m.tap_dart(at(winner, 2)).unwrap();
    for i in 0..3 {
        m.set_status(at(winner.other(), i), DartStatus::Missed).unwrap();
    }
    m.set_closest(Some(ClosestSelection::player(winner))).unwrap();
}

fn recorded(submission: Submission) -> (RoundSummary, bool) {
    match submission {
        Submission::Recorded { round, completed } => (round, completed.is_some()),
        Submission::WashConfirmationRequired => panic!("expected a recorded round"),
    }
}

#[test]
fn both_players_need_names() {
    let err = MatchController::new(
        Player::new("Ada", ""),
        Player::new("   ", ""),
        InputMode::Casual,
        Side::One,
    )
    .unwrap_err();
    assert_eq!(err, MatchError::MissingPlayerName(Side::Two));
}

#[test]
fn preferences_pick_input_mode() {
    let prefs = Preferences {
        advanced_closest_tracking: true,
        ..Preferences::default()
    };
    assert_eq!(prefs.input_mode(), InputMode::Advanced);
    assert_eq!(Preferences::default().input_mode(), InputMode::Casual);
}

#[test]
fn closest_required_when_both_landed() {
    let mut m = new_match(InputMode::Casual);
    m.tap_dart(at(Side::One, 0)).unwrap();
    m.tap_dart(at(Side::Two, 0)).unwrap();
    assert_eq!(m.submit_round(false), Err(MatchError::ClosestRequired));
    assert!(m.state.round_history.is_empty());
}

#[test]
fn closest_inferred_when_only_one_player_landed() {
    let mut m = new_match(InputMode::Casual);
    m.tap_dart(at(Side::Two, 1)).unwrap();
    m.set_status(at(Side::One, 0), DartStatus::Missed).unwrap();

    let (round, _) = recorded(m.submit_round(false).unwrap());
    assert_eq!(round.player2_points, 4);
    assert_eq!(round.winner, Some(Side::Two));
    assert_eq!(m.state.player2_score, 4);
    assert_eq!(m.state.first_thrower, Side::Two);
}

#[test]
fn closest_player_must_have_landed() {
    let mut m = new_match(InputMode::Casual);
    m.tap_dart(at(Side::One, 0)).unwrap();
    m.set_status(at(Side::Two, 0), DartStatus::Missed).unwrap();
    m.set_closest(Some(ClosestSelection::player(Side::Two))).unwrap();
    assert_eq!(
        m.submit_round(false),
        Err(MatchError::ClosestHasNoLandedDart(Side::Two))
    );
}

#[test]
fn unresolved_player_blocks_submission() {
    let mut m = new_match(InputMode::Casual);
    m.tap_dart(at(Side::One, 0)).unwrap();
    assert_eq!(
        m.submit_round(false),
        Err(MatchError::UnresolvedDarts(Side::Two))
    );
}

#[test]
fn zero_landed_round_needs_wash_confirmation() {
    let mut m = new_match(InputMode::Advanced);
    m.tap_dart(at(Side::One, 0)).unwrap();
    m.tap_dart(at(Side::One, 0)).unwrap(); // missed

    assert_eq!(
        m.submit_round(false),
        Ok(Submission::WashConfirmationRequired)
    );
    assert!(m.state.round_history.is_empty());
    assert_eq!(m.state.first_thrower, Side::One);

    let (round, completed) = recorded(m.submit_round(true).unwrap());
    assert!(!completed);
    assert_eq!(round.winner, None);
    assert_eq!(round.net_score, 0);
    let stored = m.state.last_round().unwrap();
    assert!(stored.darts.iter().all(|(_, d)| d.status == DartStatus::Missed));
    assert_eq!(stored.winner_code(), 0);
    assert_eq!((m.state.player1_score, m.state.player2_score), (0, 0));
    assert_eq!(m.state.first_thrower, Side::Two);
}

#[test]
fn preview_does_not_record() {
    let mut m = new_match(InputMode::Casual);
    enter_sweep(&mut m, Side::One);
    let preview = m.preview().unwrap();
    assert_eq!(preview.player1_points, 5);
    assert_eq!(preview.net_score, 5);
    assert_eq!(preview.round_number, 1);
    assert!(m.state.round_history.is_empty());
    assert_eq!(m.current.total_landed(), 3);
}

#[test]
fn discard_abandons_the_buffer() {
    let mut m = new_match(InputMode::Casual);
    enter_sweep(&mut m, Side::One);
    m.discard_round();
    assert_eq!(m.current, RoundDarts::new());
    assert_eq!(m.state.current_round_number, 1);
}

#[test]
fn casual_mode_drops_pinned_closest_dart() {
    let mut m = new_match(InputMode::Casual);
    m.tap_dart(at(Side::One, 1)).unwrap();
    m.set_closest(Some(ClosestSelection::dart(at(Side::One, 1))))
        .unwrap();
    assert_eq!(
        m.current.closest(),
        Some(ClosestSelection::player(Side::One))
    );
}

#[test]
fn casual_edit_drops_pinned_closest_dart() {
    let mut m = new_match(InputMode::Casual);
    enter_sweep(&mut m, Side::One);
    m.submit_round(false).unwrap();

    let mut darts = m.last_round_darts().unwrap();
    darts
        .set_closest(Some(ClosestSelection::dart(at(Side::One, 2))))
        .unwrap();
    let (round, _) = recorded(m.edit_last_round(darts, false).unwrap());
    assert_eq!(round.player1_points, 5);

    let stored = m.last_round_darts().unwrap();
    assert_eq!(stored.closest(), Some(ClosestSelection::player(Side::One)));
}

#[test]
fn match_ends_at_twenty_one_and_locks() {
    let mut m = new_match(InputMode::Casual);
    let mut finished = false;
    for _ in 0..5 {
        enter_sweep(&mut m, Side::One);
        let (_, done) = recorded(m.submit_round(false).unwrap());
        finished = done;
    }
    assert!(finished);
    assert_eq!(m.winner, Some(Side::One));
    assert_eq!(m.state.player1_score, WINNING_SCORE);
    assert_eq!(m.state.player1_rounds_won, 5);

    assert_eq!(m.tap_dart(at(Side::One, 0)), Err(MatchError::MatchOver));
    assert_eq!(m.submit_round(true), Err(MatchError::MatchOver));

    let summary = m.summary().unwrap();
    assert_eq!(summary.winner_name, "Ada");
    assert_eq!(summary.round_history.len(), 5);
}

#[test]
fn editing_last_round_can_undo_a_win() {
    let mut m = new_match(InputMode::Casual);
    for _ in 0..5 {
        enter_sweep(&mut m, Side::One);
        m.submit_round(false).unwrap();
    }
    assert!(m.is_over());

    let mut darts = m.last_round_darts().unwrap();
    darts.set_status(at(Side::One, 0), DartStatus::Missed).unwrap();
    darts.set_status(at(Side::One, 1), DartStatus::Missed).unwrap();
    darts.set_status(at(Side::One, 2), DartStatus::Missed).unwrap();
    darts.set_status(at(Side::Two, 0), DartStatus::Landed).unwrap();
    darts
        .set_closest(Some(ClosestSelection::player(Side::Two)))
        .unwrap();

    let (round, completed) = recorded(m.edit_last_round(darts, false).unwrap());
    assert!(!completed);
    assert_eq!(round.winner, Some(Side::Two));
    assert_eq!(round.round_number, 5);
    assert_eq!(m.winner, None);
    assert_eq!(m.state.player1_score, 20);
    assert_eq!(m.state.player2_score, 3);
    assert_eq!(m.state.player1_rounds_won, 4);
    assert_eq!(m.state.player2_rounds_won, 1);
    assert_eq!(m.state.first_thrower, Side::Two);
    assert_eq!(m.state.round_history.len(), 5);

    // Play continues after the edit.
    enter_sweep(&mut m, Side::One);
    m.submit_round(false).unwrap();
    assert_eq!(m.state.current_round_number, 7);
}

#[test]
fn editing_with_same_darts_is_idempotent() {
    let mut m = new_match(InputMode::Casual);
    enter_sweep(&mut m, Side::One);
    m.submit_round(false).unwrap();
    enter_sweep(&mut m, Side::Two);
    m.submit_round(false).unwrap();
    let before = m.state.clone();

    let darts = m.last_round_darts().unwrap();
    m.edit_last_round(darts, false).unwrap();

    assert_eq!(m.state.player1_score, before.player1_score);
    assert_eq!(m.state.player2_score, before.player2_score);
    assert_eq!(m.state.player1_rounds_won, before.player1_rounds_won);
    assert_eq!(m.state.player2_rounds_won, before.player2_rounds_won);
    assert_eq!(m.state.first_thrower, before.first_thrower);
}

#[test]
fn edit_without_history_fails() {
    let mut m = new_match(InputMode::Casual);
    assert_eq!(
        m.edit_last_round(RoundDarts::new(), true),
        Err(MatchError::NoRoundToEdit)
    );
}

#[test]
fn reset_keeps_players() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = MatchController::with_coin_flip(
        Player::new("Ada", "teal"),
        Player::new("Bo", "coral"),
        InputMode::Casual,
        &mut rng,
    )
    .unwrap();
    for _ in 0..5 {
        enter_sweep(&mut m, Side::Two);
        m.submit_round(false).unwrap();
    }
    assert_eq!(m.winner, Some(Side::Two));

    m.reset_match(Side::One);
    assert_eq!(m.winner, None);
    assert!(m.state.round_history.is_empty());
    assert_eq!(m.state.current_round_number, 1);
    assert_eq!((m.state.player1_score, m.state.player2_score), (0, 0));
    assert_eq!(m.player1.name, "Ada");
    assert_eq!(m.player2.color_ref, "coral");
}
