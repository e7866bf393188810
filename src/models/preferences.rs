//! Preferences supplied by the identity provider.

use serde::{Deserialize, Serialize};

/// How dart taps are interpreted while a round is being entered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Darts resolve as a position cascade; closest is picked per player.
    #[default]
    Casual,
    /// Each dart cycles through empty/landed/missed; closest names one dart.
    Advanced,
}

/// Acting player's preferences. Only `advanced_closest_tracking` affects scoring input.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub favorite_color: String,
    #[serde(default)]
    pub advanced_closest_tracking: bool,
}

impl Preferences {
    pub fn input_mode(&self) -> InputMode {
        if self.advanced_closest_tracking {
            InputMode::Advanced
        } else {
            InputMode::Casual
        }
    }
}
