//! Single-elimination bracket: slots, matches, and the bracket itself.

use crate::models::match_state::MatchState;
use crate::models::player::{Player, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bracket match.
pub type MatchId = Uuid;

/// Unique identifier for a tournament bracket.
pub type TournamentId = Uuid;

/// Fewest named players a bracket can start with.
pub const MIN_BRACKET_PLAYERS: usize = 4;

/// Largest supported field.
pub const MAX_BRACKET_PLAYERS: usize = 16;

/// Errors that can occur while building or advancing a bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Need at least 4 named players.
    NotEnoughPlayers { named: usize },
    /// Brackets above 16 players are not supported.
    TooManyPlayers { count: usize },
    /// Player names are unique (case-insensitive).
    DuplicatePlayerName(String),
    MatchNotFound(MatchId),
    MatchAlreadyCompleted(MatchId),
    /// One of the slots is still waiting for a winner.
    SlotsNotFilled(MatchId),
    /// Only one match may be paused at a time.
    AnotherMatchPaused(MatchId),
    /// A different match is being played right now.
    AnotherMatchInProgress(MatchId),
    NotPaused(MatchId),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::NotEnoughPlayers { named } => write!(
                f,
                "Need at least {} named players to start (have {})",
                MIN_BRACKET_PLAYERS, named
            ),
            BracketError::TooManyPlayers { count } => write!(
                f,
                "Brackets support at most {} players (got {})",
                MAX_BRACKET_PLAYERS, count
            ),
            BracketError::DuplicatePlayerName(name) => {
                write!(f, "A player named {} already exists", name)
            }
            BracketError::MatchNotFound(_) => write!(f, "Match not found"),
            BracketError::MatchAlreadyCompleted(_) => write!(f, "Match already completed"),
            BracketError::SlotsNotFilled(_) => write!(f, "Match is still waiting for players"),
            BracketError::AnotherMatchPaused(_) => write!(f, "Another match is already paused"),
            BracketError::AnotherMatchInProgress(_) => {
                write!(f, "Another match is in progress")
            }
            BracketError::NotPaused(_) => write!(f, "Match is not paused"),
        }
    }
}

impl std::error::Error for BracketError {}

/// One side of a bracket match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum Slot {
    /// Waiting for the winner of a source match.
    #[default]
    Open,
    /// No opponent; the paired player advances without playing.
    Bye,
    Player(Player),
}

impl Slot {
    pub fn player(&self) -> Option<&Player> {
        match self {
            Slot::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }
}

/// A node in the bracket graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    /// 1-based.
    pub round: u32,
    /// 1-based within the round.
    pub match_number: u32,
    pub player1: Slot,
    pub player2: Slot,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner: Option<Player>,
    pub completed: bool,
    /// Match whose winner fills `player1`.
    pub source_match1_id: Option<MatchId>,
    /// Match whose winner fills `player2`.
    pub source_match2_id: Option<MatchId>,
    /// Live match snapshot while paused.
    #[serde(default)]
    pub paused_scores: Option<MatchState>,
}

impl BracketMatch {
    pub fn new(round: u32, match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            player1: Slot::Open,
            player2: Slot::Open,
            player1_score: 0,
            player2_score: 0,
            winner: None,
            completed: false,
            source_match1_id: None,
            source_match2_id: None,
            paused_scores: None,
        }
    }

    pub fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::One => &self.player1,
            Side::Two => &self.player2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    /// Both players, if both slots hold real players.
    pub fn players(&self) -> Option<(&Player, &Player)> {
        Some((self.player1.player()?, self.player2.player()?))
    }

    /// Not completed and both players known.
    pub fn is_playable(&self) -> bool {
        !self.completed && self.players().is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_scores.is_some()
    }
}

/// A seeded single-elimination bracket. Its shape is fixed at creation; only
/// match contents change as the tournament progresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentBracket {
    pub id: TournamentId,
    /// `rounds[0]` holds only real round-1 matches; later rounds are fully pre-allocated.
    pub rounds: Vec<Vec<BracketMatch>>,
    pub total_rounds: u32,
    pub bracket_size: usize,
    /// Nominal round-1 slots (players and byes) in seed order.
    pub seeding: Vec<Slot>,
    /// Match currently being played.
    pub active_match: Option<MatchId>,
    pub champion: Option<Player>,
    pub created_at: DateTime<Utc>,
}

impl TournamentBracket {
    pub fn find_match(&self, id: MatchId) -> Option<&BracketMatch> {
        self.rounds.iter().flatten().find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        self.rounds.iter_mut().flatten().find(|m| m.id == id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &BracketMatch> {
        self.rounds.iter().flatten()
    }

    /// The match currently holding a paused snapshot, if any.
    pub fn paused_match(&self) -> Option<&BracketMatch> {
        self.matches().find(|m| m.is_paused())
    }

    pub fn bye_count(&self) -> usize {
        self.seeding.iter().filter(|s| s.is_bye()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.champion.is_some()
    }
}
