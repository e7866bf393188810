//! The specialty shot catalog: named landing outcomes and their point values.

use serde::{Deserialize, Serialize};

/// Points for an ordinary landed dart.
pub const ORDINARY_POINTS: u32 = 1;

/// Points for the closest player's first ordinary dart when the bonus applies.
pub const CLOSEST_ORDINARY_POINTS: u32 = 3;

/// A named dart-landing outcome.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialtyShot {
    Lippy,
    Tower,
    FenderBender,
    TNobber,
    InchWorm,
    TripleNobber,
    WiggleNobber,
}

/// Shots sharing a group may appear at most once per round, across both players.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CapGroup {
    Tower,
    /// T-Nobber and Inch Worm share a single slot.
    Nobber,
    TripleNobber,
}

impl SpecialtyShot {
    pub const ALL: [SpecialtyShot; 7] = [
        SpecialtyShot::Lippy,
        SpecialtyShot::Tower,
        SpecialtyShot::FenderBender,
        SpecialtyShot::TNobber,
        SpecialtyShot::InchWorm,
        SpecialtyShot::TripleNobber,
        SpecialtyShot::WiggleNobber,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Lippy => "Lippy",
            Self::Tower => "Tower",
            Self::FenderBender => "Fender Bender",
            Self::TNobber => "T-Nobber",
            Self::InchWorm => "Inch Worm",
            Self::TripleNobber => "Triple Nobber",
            Self::WiggleNobber => "Wiggle Nobber",
        }
    }

    /// Fixed value of the shot. A wiggle nobber has none of its own.
    pub fn base_points(self) -> u32 {
        match self {
            Self::Lippy => 2,
            Self::FenderBender => 2,
            Self::Tower => 5,
            Self::TNobber => 10,
            Self::InchWorm => 11,
            Self::TripleNobber => 20,
            Self::WiggleNobber => 0,
        }
    }

    /// Value when thrown by the closest player and the round does not suppress bonuses.
    pub fn closest_points(self) -> Option<u32> {
        match self {
            Self::Lippy => Some(4),
            _ => None,
        }
    }

    pub fn cap_group(self) -> Option<CapGroup> {
        match self {
            Self::Tower => Some(CapGroup::Tower),
            Self::TNobber | Self::InchWorm => Some(CapGroup::Nobber),
            Self::TripleNobber => Some(CapGroup::TripleNobber),
            _ => None,
        }
    }

    /// Presence anywhere in a round cancels every closest bonus.
    pub fn suppresses_closest_bonus(self) -> bool {
        matches!(self, Self::TNobber | Self::InchWorm)
    }

    pub fn requires_target(self) -> bool {
        self == Self::WiggleNobber
    }
}

impl std::fmt::Display for SpecialtyShot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
