use thiserror::Error;

use crate::model::GameMode;
use crate::phase::ROUND_BREAK_SECS;

pub const DEFAULT_TOTAL_ROUNDS: u32 = 5;
pub const DEFAULT_TIME_PER_ROUND_SECS: u32 = 20;
pub const MAX_TOTAL_ROUNDS: u32 = 100;
pub const MIN_TIME_PER_ROUND_SECS: u32 = 3;
pub const MAX_TIME_PER_ROUND_SECS: u32 = 600;
pub const DEFAULT_OPPONENT_LABEL: &str = "Opponent";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("total rounds must be between 1 and 100, got {0}")]
    InvalidTotalRounds(u32),

    #[error("time per round must be between 3 and 600 seconds, got {0}")]
    InvalidTimePerRound(u32),

    #[error("opponent label cannot be blank")]
    BlankOpponentLabel,
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Settings for one game, fixed when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    mode: GameMode,
    total_rounds: u32,
    time_per_round_secs: u32,
    opponent_label: Option<String>,
}

impl GameConfig {
    /// Defaults for `mode`: 5 rounds of 20 seconds, and an `"Opponent"`
    /// label for modes that have one.
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            time_per_round_secs: DEFAULT_TIME_PER_ROUND_SECS,
            opponent_label: mode
                .has_opponent()
                .then(|| DEFAULT_OPPONENT_LABEL.to_owned()),
        }
    }

    #[must_use]
    pub fn with_total_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = total_rounds;
        self
    }

    #[must_use]
    pub fn with_time_per_round(mut self, secs: u32) -> Self {
        self.time_per_round_secs = secs;
        self
    }

    /// Ignored for solo games.
    #[must_use]
    pub fn with_opponent_label(mut self, label: impl Into<String>) -> Self {
        if self.mode.has_opponent() {
            self.opponent_label = Some(label.into());
        }
        self
    }

    /// Check every bound.
    ///
    /// The round timer needs at least three seconds so the opponent's
    /// cosmetic answer time `(1, time - 1)` is a real range.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOTAL_ROUNDS).contains(&self.total_rounds) {
            return Err(ConfigError::InvalidTotalRounds(self.total_rounds));
        }
        if !(MIN_TIME_PER_ROUND_SECS..=MAX_TIME_PER_ROUND_SECS).contains(&self.time_per_round_secs)
        {
            return Err(ConfigError::InvalidTimePerRound(self.time_per_round_secs));
        }
        if self
            .opponent_label
            .as_deref()
            .is_some_and(|label| label.trim().is_empty())
        {
            return Err(ConfigError::BlankOpponentLabel);
        }
        Ok(())
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    #[must_use]
    pub fn time_per_round_secs(&self) -> u32 {
        self.time_per_round_secs
    }

    /// Always [`ROUND_BREAK_SECS`].
    #[must_use]
    pub fn round_break_secs(&self) -> u32 {
        ROUND_BREAK_SECS
    }

    #[must_use]
    pub fn opponent_label(&self) -> Option<&str> {
        self.opponent_label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_depend_on_mode() {
        let solo = GameConfig::new(GameMode::Solo);
        assert_eq!(solo.total_rounds(), 5);
        assert_eq!(solo.time_per_round_secs(), 20);
        assert_eq!(solo.round_break_secs(), 5);
        assert_eq!(solo.opponent_label(), None);
        assert!(solo.validate().is_ok());

        let duel = GameConfig::new(GameMode::Duel);
        assert_eq!(duel.opponent_label(), Some("Opponent"));
    }

    #[test]
    fn solo_ignores_opponent_label() {
        let solo = GameConfig::new(GameMode::Solo).with_opponent_label("Rival");
        assert_eq!(solo.opponent_label(), None);
        let duel = GameConfig::new(GameMode::Duel).with_opponent_label("Rival");
        assert_eq!(duel.opponent_label(), Some("Rival"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let zero_rounds = GameConfig::new(GameMode::Solo).with_total_rounds(0);
        assert_eq!(
            zero_rounds.validate(),
            Err(ConfigError::InvalidTotalRounds(0))
        );

        let too_short = GameConfig::new(GameMode::Solo).with_time_per_round(2);
        assert_eq!(
            too_short.validate(),
            Err(ConfigError::InvalidTimePerRound(2))
        );

        let blank = GameConfig::new(GameMode::Tournament).with_opponent_label("  ");
        assert_eq!(blank.validate(), Err(ConfigError::BlankOpponentLabel));
    }
}
