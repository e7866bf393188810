//! Bracket generation: seed a player list into a single-elimination bracket with byes.

use crate::models::{
    BracketError, BracketMatch, MatchId, Player, Slot, TournamentBracket, MAX_BRACKET_PLAYERS,
    MIN_BRACKET_PLAYERS,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

/// A nominal round-1 position before round 2 is wired up.
enum Entry {
    /// Player advancing straight to round 2.
    Bye(Player),
    /// A real round-1 match.
    Match(MatchId),
}

/// Start a tournament from the entered players, seeding randomly.
pub fn start_tournament(players: Vec<Player>) -> Result<TournamentBracket, BracketError> {
    generate_bracket(players, &mut rand::thread_rng())
}

/// Build a bracket for 4..=16 named players.
///
/// 1. Drop blank names; reject too few, too many, or duplicate names.
/// 2. Shuffle.
/// 3. Size the bracket to the next power of two; the first `ceil(byes/2)` and
///    last `floor(byes/2)` seeds get byes, the rest pair up in order.
/// 4. Round 2 is fed in seed order by bye players and round-1 winners; every
///    later round is pre-allocated with source links to the previous round.
pub fn generate_bracket<R: Rng + ?Sized>(
    players: Vec<Player>,
    rng: &mut R,
) -> Result<TournamentBracket, BracketError> {
    let mut players: Vec<Player> = players.into_iter().filter(Player::has_name).collect();
    if players.len() < MIN_BRACKET_PLAYERS {
        return Err(BracketError::NotEnoughPlayers {
            named: players.len(),
        });
    }
    if players.len() > MAX_BRACKET_PLAYERS {
        return Err(BracketError::TooManyPlayers {
            count: players.len(),
        });
    }
    for (i, p) in players.iter().enumerate() {
        if players[..i]
            .iter()
            .any(|q| q.name.trim().eq_ignore_ascii_case(p.name.trim()))
        {
            return Err(BracketError::DuplicatePlayerName(p.name.clone()));
        }
    }

    players.shuffle(rng);

    let n = players.len();
    let bracket_size = n.next_power_of_two();
    let total_rounds = bracket_size.trailing_zeros();
    let byes = bracket_size - n;
    let front_byes = byes.div_ceil(2);
    let back_byes = byes / 2;

    let back: Vec<Player> = players.split_off(n - back_byes);
    let middle: Vec<Player> = players.split_off(front_byes);
    let front = players;

    let mut seeding = Vec::with_capacity(bracket_size);
    let mut first_round = Vec::new();
    let mut entries = Vec::with_capacity(bracket_size / 2);

    for p in front {
        seeding.push(Slot::Player(p.clone()));
        seeding.push(Slot::Bye);
        entries.push(Entry::Bye(p));
    }
    for pair in middle.chunks_exact(2) {
        let mut m = BracketMatch::new(1, first_round.len() as u32 + 1);
        m.player1 = Slot::Player(pair[0].clone());
        m.player2 = Slot::Player(pair[1].clone());
        seeding.push(m.player1.clone());
        seeding.push(m.player2.clone());
        entries.push(Entry::Match(m.id));
        first_round.push(m);
    }
    for p in back {
        seeding.push(Slot::Player(p.clone()));
        seeding.push(Slot::Bye);
        entries.push(Entry::Bye(p));
    }

    let mut rounds = vec![first_round];
    if total_rounds >= 2 {
        let second_round: Vec<BracketMatch> = entries
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let mut m = BracketMatch::new(2, i as u32 + 1);
                for (entry, (slot, source)) in pair.iter().zip([
                    (&mut m.player1, &mut m.source_match1_id),
                    (&mut m.player2, &mut m.source_match2_id),
                ]) {
                    match entry {
                        Entry::Bye(p) => *slot = Slot::Player(p.clone()),
                        Entry::Match(id) => *source = Some(*id),
                    }
                }
                m
            })
            .collect();
        rounds.push(second_round);
    }
    for round in 3..=total_rounds {
        let next: Vec<BracketMatch> = rounds[round as usize - 2]
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let mut m = BracketMatch::new(round, i as u32 + 1);
                m.source_match1_id = Some(pair[0].id);
                m.source_match2_id = Some(pair[1].id);
                m
            })
            .collect();
        rounds.push(next);
    }

    log::info!(
        "Bracket generated: {} players, size {}, {} byes, {} rounds",
        n,
        bracket_size,
        byes,
        total_rounds
    );

    Ok(TournamentBracket {
        id: Uuid::new_v4(),
        rounds,
        total_rounds,
        bracket_size,
        seeding,
        active_match: None,
        champion: None,
        created_at: Utc::now(),
    })
}
