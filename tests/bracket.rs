//! Integration tests for bracket generation and advancement.

use popdarts_scorer::{
    complete_match, generate_bracket, pause_match, playable_matches, resume_match, start_match,
    start_tournament, Advancement, BracketError, MatchState, Player, Side, Slot,
    TournamentBracket,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn players(n: usize) -> Vec<Player> {
    (0..n).map(|i| Player::new(format!("P{i}"), "")).collect()
}

fn bracket(n: usize, seed: u64) -> TournamentBracket {
    generate_bracket(players(n), &mut StdRng::seed_from_u64(seed)).unwrap()
}

/// Play every match to completion, slot one always winning.
fn play_out(b: &mut TournamentBracket) -> usize {
    let mut played = 0;
    while let Some(id) = playable_matches(b).first().map(|m| m.id) {
        complete_match(b, id, Side::One, (21, 7)).unwrap();
        played += 1;
    }
    played
}

#[test]
fn seeding_has_power_of_two_slots_with_exact_byes() {
    for n in 4..=16 {
        let input = players(n);
        let ids: HashSet<_> = input.iter().map(|p| p.id).collect();
        let b = generate_bracket(input, &mut StdRng::seed_from_u64(n as u64)).unwrap();

        let size = n.next_power_of_two();
        assert_eq!(b.bracket_size, size, "n={n}");
        assert_eq!(b.seeding.len(), size, "n={n}");
        assert_eq!(b.bye_count(), size - n, "n={n}");

        let seeded: Vec<_> = b.seeding.iter().filter_map(Slot::player).map(|p| p.id).collect();
        assert_eq!(seeded.len(), n, "n={n}");
        assert_eq!(seeded.iter().copied().collect::<HashSet<_>>(), ids, "n={n}");

        assert_eq!(b.total_rounds, size.trailing_zeros(), "n={n}");
        assert_eq!(b.rounds.len() as u32, b.total_rounds, "n={n}");
        assert_eq!(b.rounds[0].len(), (n - (size - n)) / 2, "n={n}");
        for (k, round) in b.rounds.iter().enumerate().skip(1) {
            assert_eq!(round.len(), size >> (k + 1), "n={n} round={}", k + 1);
        }
    }
}

#[test]
fn five_players_seed_byes_straight_into_round_two() {
    let b = bracket(5, 11);
    assert_eq!(b.bracket_size, 8);
    assert_eq!(b.bye_count(), 3);
    assert_eq!(b.rounds[0].len(), 1);

    let round_two = &b.rounds[1];
    assert_eq!(round_two.len(), 2);
    let direct: usize = round_two
        .iter()
        .map(|m| [&m.player1, &m.player2].iter().filter(|s| s.player().is_some()).count())
        .sum();
    assert_eq!(direct, 3);

    // The one open round-two slot is fed by the round-one match.
    let r1 = b.rounds[0][0].id;
    let fed: Vec<_> = round_two
        .iter()
        .flat_map(|m| [m.source_match1_id, m.source_match2_id])
        .flatten()
        .collect();
    assert_eq!(fed, vec![r1]);

    assert_eq!(b.rounds[2].len(), 1);
    let final_match = &b.rounds[2][0];
    assert_eq!(final_match.source_match1_id, Some(round_two[0].id));
    assert_eq!(final_match.source_match2_id, Some(round_two[1].id));
}

#[test]
fn byes_go_to_both_ends_of_the_seed_order() {
    // 6 players: 2 byes, one at each end.
    let b = bracket(6, 5);
    assert!(b.seeding[1].is_bye());
    assert!(b.seeding[7].is_bye());
    assert!(b.seeding[2..6].iter().all(|s| s.player().is_some()));
}

#[test]
fn player_count_limits() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        generate_bracket(players(3), &mut rng),
        Err(BracketError::NotEnoughPlayers { named: 3 })
    );
    assert_eq!(
        generate_bracket(players(17), &mut rng),
        Err(BracketError::TooManyPlayers { count: 17 })
    );

    let mut with_blank = players(3);
    with_blank.push(Player::new("  ", ""));
    assert_eq!(
        start_tournament(with_blank),
        Err(BracketError::NotEnoughPlayers { named: 3 })
    );

    let mut dupes = players(4);
    dupes.push(Player::new("p1", ""));
    assert_eq!(
        start_tournament(dupes),
        Err(BracketError::DuplicatePlayerName("p1".to_string()))
    );
}

#[test]
fn every_field_size_plays_out_to_a_champion() {
    for n in 4..=16 {
        let mut b = bracket(n, 40 + n as u64);
        let played = play_out(&mut b);
        assert_eq!(played, n - 1, "n={n}");
        assert!(b.is_complete(), "n={n}");
        assert!(b.matches().all(|m| m.completed), "n={n}");
        let final_winner = b.rounds.last().unwrap()[0].winner.clone();
        assert_eq!(b.champion, final_winner, "n={n}");
    }
}

#[test]
fn winner_fills_the_slot_named_by_its_source() {
    let mut b = bracket(8, 2);
    let second = b.rounds[0][1].id;
    let winner = b.rounds[0][1].player2.player().cloned().unwrap();

    let advancement = complete_match(&mut b, second, Side::Two, (9, 21)).unwrap();
    let next_id = b.rounds[1][0].id;
    assert_eq!(advancement, Advancement::Advanced { next_match: next_id });

    let next = &b.rounds[1][0];
    assert_eq!(next.player1, Slot::Open);
    assert_eq!(next.player2, Slot::Player(winner.clone()));

    let done = b.find_match(second).unwrap();
    assert!(done.completed);
    assert_eq!((done.player1_score, done.player2_score), (9, 21));
    assert_eq!(done.winner, Some(winner));
}

#[test]
fn start_is_a_no_op_for_unready_or_finished_matches() {
    let mut b = bracket(8, 3);
    let waiting = b.rounds[1][0].id;
    assert_eq!(start_match(&mut b, waiting), None);
    assert_eq!(b.active_match, None);

    let first = b.rounds[0][0].id;
    complete_match(&mut b, first, Side::One, (21, 0)).unwrap();
    assert_eq!(start_match(&mut b, first), None);

    let other = b.rounds[0][1].id;
    assert!(start_match(&mut b, other).is_some());
    assert_eq!(b.active_match, Some(other));

    // Only one match in progress at a time, and starting it again does nothing.
    let third = b.rounds[0][2].id;
    assert_eq!(start_match(&mut b, third), None);
    assert_eq!(start_match(&mut b, other), None);
    assert_eq!(b.active_match, Some(other));
}

#[test]
fn pause_and_resume_round_trip_the_live_state() {
    let mut b = bracket(8, 4);
    let first = b.rounds[0][0].id;
    let second = b.rounds[0][1].id;
    start_match(&mut b, first).unwrap();

    let mut live = MatchState::new(Side::Two);
    live.player1_score = 12;
    live.player2_score = 9;
    live.current_round_number = 6;
    pause_match(&mut b, first, &live).unwrap();

    let paused = b.find_match(first).unwrap();
    assert!(paused.is_paused());
    assert!(!paused.completed);
    assert_eq!((paused.player1_score, paused.player2_score), (12, 9));
    assert_eq!(b.active_match, None);

    start_match(&mut b, second).unwrap();
    assert_eq!(
        pause_match(&mut b, second, &MatchState::new(Side::One)),
        Err(BracketError::AnotherMatchPaused(first))
    );
    assert_eq!(
        resume_match(&mut b, first),
        Err(BracketError::AnotherMatchInProgress(second))
    );
    complete_match(&mut b, second, Side::One, (21, 3)).unwrap();

    let restored = resume_match(&mut b, first).unwrap();
    assert_eq!(restored, live);
    assert_eq!(b.active_match, Some(first));
    assert!(!b.find_match(first).unwrap().is_paused());
    assert_eq!(
        resume_match(&mut b, first),
        Err(BracketError::NotPaused(first))
    );
}

#[test]
fn completing_clears_pause_and_crowns_champion() {
    let mut b = bracket(4, 9);
    let semi1 = b.rounds[0][0].id;
    let semi2 = b.rounds[0][1].id;
    pause_match(&mut b, semi1, &MatchState::new(Side::One)).unwrap();
    complete_match(&mut b, semi1, Side::One, (21, 15)).unwrap();
    assert!(b.paused_match().is_none());
    complete_match(&mut b, semi2, Side::Two, (18, 21)).unwrap();

    let final_id = b.rounds[1][0].id;
    let expected = b.rounds[1][0].player1.player().cloned().unwrap();
    match complete_match(&mut b, final_id, Side::One, (21, 20)).unwrap() {
        Advancement::Champion { player } => assert_eq!(player, expected),
        other => panic!("expected champion, got {other:?}"),
    }
    assert_eq!(b.champion, Some(expected));
    assert_eq!(
        complete_match(&mut b, final_id, Side::Two, (0, 21)),
        Err(BracketError::MatchAlreadyCompleted(final_id))
    );
}

#[test]
fn paused_match_only_comes_back_through_resume() {
    let mut b = bracket(8, 6);
    let first = b.rounds[0][0].id;
    start_match(&mut b, first).unwrap();
    let mut live = MatchState::new(Side::One);
    live.player1_score = 12;
    pause_match(&mut b, first, &live).unwrap();

    assert_eq!(start_match(&mut b, first), None);
    assert_eq!(b.active_match, None);
    assert!(b.find_match(first).unwrap().is_paused());

    // A paused match is not in the way of starting another one.
    let second = b.rounds[0][1].id;
    assert!(start_match(&mut b, second).is_some());
    complete_match(&mut b, second, Side::Two, (4, 21)).unwrap();

    assert_eq!(resume_match(&mut b, first).unwrap().player1_score, 12);
    assert_eq!(b.active_match, Some(first));
}

#[test]
fn only_the_match_in_progress_can_be_paused() {
    let mut b = bracket(8, 8);
    let first = b.rounds[0][0].id;
    let third = b.rounds[0][2].id;
    start_match(&mut b, first).unwrap();

    assert_eq!(
        pause_match(&mut b, third, &MatchState::new(Side::One)),
        Err(BracketError::AnotherMatchInProgress(first))
    );
    assert!(!b.find_match(third).unwrap().is_paused());

    pause_match(&mut b, first, &MatchState::new(Side::One)).unwrap();
    assert_eq!(b.active_match, None);
    assert_eq!(b.paused_match().map(|m| m.id), Some(first));
}
