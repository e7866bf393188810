//! Player identity and the two sides of a match.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in brackets and lookups).
pub type PlayerId = Uuid;

/// Which of the two players (or bracket slots) something belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// 1 or 2, as shown to players.
    pub fn number(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

/// A player in a match or tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Opaque key into the colour catalog; carried for identity only.
    #[serde(default)]
    pub color_ref: String,
}

impl Player {
    /// Create a new player with a fresh id. The name is trimmed.
    pub fn new(name: impl Into<String>, color_ref: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            color_ref: color_ref.into(),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
