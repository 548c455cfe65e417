use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing a `GameMode` from its stored name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown game mode: {raw}")]
pub struct ParseModeError {
    raw: String,
}

/// How a game is played.
///
/// - `Solo`: the player alone, no opponent score
/// - `Duel`: one simulated opponent
/// - `Tournament`: a simulated opponent, entered from the tournament lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Solo,
    Duel,
    Tournament,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Solo, GameMode::Duel, GameMode::Tournament];

    /// Stable lowercase name used in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Solo => "solo",
            GameMode::Duel => "duel",
            GameMode::Tournament => "tournament",
        }
    }

    /// Whether rounds in this mode also score a simulated opponent.
    #[must_use]
    pub fn has_opponent(self) -> bool {
        !matches!(self, GameMode::Solo)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solo" => Ok(GameMode::Solo),
            "duel" => Ok(GameMode::Duel),
            "tournament" => Ok(GameMode::Tournament),
            _ => Err(ParseModeError { raw: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_solo_has_no_opponent() {
        assert!(!GameMode::Solo.has_opponent());
        assert!(GameMode::Duel.has_opponent());
        assert!(GameMode::Tournament.has_opponent());
    }

    #[test]
    fn names_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(mode.as_str().parse::<GameMode>().unwrap(), mode);
        }
        assert_eq!("Duel".parse::<GameMode>().unwrap(), GameMode::Duel);
        assert!("battle".parse::<GameMode>().is_err());
    }
}
