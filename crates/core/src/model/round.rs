use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::RoundNumber;
use crate::opponent::OpponentAttempt;
use crate::scoring::ScoringPolicy;

/// Text recorded for a skipped or timed-out round.
pub const SKIPPED_MARKER: &str = "skipped";

//
// ─── PLAYER ANSWER ─────────────────────────────────────────────────────────────
//

/// How the player closed a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PlayerAnswer {
    /// A non-empty submitted answer, trimmed.
    Answered(String),
    /// Submit pressed with an empty field.
    Blank,
    /// Explicit skip.
    Skipped,
    /// The round timer reached zero first.
    TimedOut,
}

impl PlayerAnswer {
    /// Classify raw text from the answer field.
    #[must_use]
    pub fn from_submission(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Blank
        } else {
            Self::Answered(trimmed.to_owned())
        }
    }

    /// The answer as shown in round history: the text, `""` for a blank
    /// submit, `"skipped"` for skips and timeouts.
    #[must_use]
    pub fn as_recorded(&self) -> &str {
        match self {
            PlayerAnswer::Answered(text) => text,
            PlayerAnswer::Blank => "",
            PlayerAnswer::Skipped | PlayerAnswer::TimedOut => SKIPPED_MARKER,
        }
    }
}

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

/// A stored round whose derived fields disagree with a fresh [`Round::close`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum RoundDataError {
    #[error("round {index}: stored answer {stored} is not the digital root {expected}")]
    CorrectAnswer { index: u32, stored: u8, expected: u8 },

    #[error("round {index}: stored correctness {stored} does not match the answer")]
    Correctness { index: u32, stored: bool },

    #[error("round {index}: stored delta {stored} does not match the scoring policy ({expected})")]
    ScoreDelta { index: u32, stored: i32, expected: i32 },

    #[error("round {index}: time taken must be finite and non-negative, got {stored}")]
    TimeTaken { index: u32, stored: f64 },
}

/// A finalized round. Built once by [`Round::close`] and never mutated.
///
/// Deserializing re-scores the round and rejects stored values that differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRound")]
pub struct Round {
    index: u32,
    number: RoundNumber,
    correct_answer: u8,
    player_answer: PlayerAnswer,
    is_correct: bool,
    time_taken_secs: f64,
    score_delta: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opponent: Option<OpponentAttempt>,
}

#[derive(Deserialize)]
struct StoredRound {
    index: u32,
    number: RoundNumber,
    correct_answer: u8,
    player_answer: PlayerAnswer,
    is_correct: bool,
    time_taken_secs: f64,
    score_delta: i32,
    #[serde(default)]
    opponent: Option<OpponentAttempt>,
}

impl TryFrom<StoredRound> for Round {
    type Error = RoundDataError;

    fn try_from(stored: StoredRound) -> Result<Self, Self::Error> {
        let index = stored.index;
        if !stored.time_taken_secs.is_finite() || stored.time_taken_secs < 0.0 {
            return Err(RoundDataError::TimeTaken {
                index,
                stored: stored.time_taken_secs,
            });
        }
        let round = Round::close(
            index,
            stored.number,
            stored.player_answer,
            stored.time_taken_secs,
            stored.opponent,
        );
        if round.correct_answer != stored.correct_answer {
            return Err(RoundDataError::CorrectAnswer {
                index,
                stored: stored.correct_answer,
                expected: round.correct_answer,
            });
        }
        if round.is_correct != stored.is_correct {
            return Err(RoundDataError::Correctness {
                index,
                stored: stored.is_correct,
            });
        }
        if round.score_delta != stored.score_delta {
            return Err(RoundDataError::ScoreDelta {
                index,
                stored: stored.score_delta,
                expected: round.score_delta,
            });
        }
        Ok(round)
    }
}

impl Round {
    /// Score and seal a round.
    ///
    /// Correctness and the delta come from [`ScoringPolicy`]; negative or
    /// non-finite times are stored as `0.0`.
    #[must_use]
    pub fn close(
        index: u32,
        number: RoundNumber,
        player_answer: PlayerAnswer,
        time_taken_secs: f64,
        opponent: Option<OpponentAttempt>,
    ) -> Self {
        let correct_answer = number.root();
        let is_correct = ScoringPolicy::is_correct(&player_answer, correct_answer);
        let score_delta = ScoringPolicy::player_delta(&player_answer, correct_answer);
        let time_taken_secs = if time_taken_secs.is_finite() {
            time_taken_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            index,
            number,
            correct_answer,
            player_answer,
            is_correct,
            time_taken_secs,
            score_delta,
            opponent,
        }
    }

    /// 1-based position in the session.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn number(&self) -> &str {
        self.number.as_str()
    }

    #[must_use]
    pub fn correct_answer(&self) -> u8 {
        self.correct_answer
    }

    #[must_use]
    pub fn player_answer(&self) -> &PlayerAnswer {
        &self.player_answer
    }

    #[must_use]
    pub fn recorded_answer(&self) -> &str {
        self.player_answer.as_recorded()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> f64 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn score_delta(&self) -> i32 {
        self.score_delta
    }

    #[must_use]
    pub fn opponent(&self) -> Option<&OpponentAttempt> {
        self.opponent.as_ref()
    }

    /// Opponent points for this round, `0` when no opponent played.
    #[must_use]
    pub fn opponent_delta(&self) -> i32 {
        self.opponent.map_or(0, |attempt| attempt.score_delta)
    }
}
