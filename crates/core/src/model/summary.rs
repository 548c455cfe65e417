use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{GameMode, Identity, Round};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("a session needs at least one round")]
    NoRounds,

    #[error("expected {expected} rounds, got {actual}")]
    RoundCountMismatch { expected: u32, actual: usize },

    #[error("stored accuracy {stored} does not match the rounds ({expected})")]
    AccuracyMismatch { stored: f64, expected: f64 },

    #[error("stored average response time {stored} does not match the rounds ({expected})")]
    AverageMismatch { stored: f64, expected: f64 },

    #[error("score ({score}) does not match the sum of round deltas ({sum})")]
    ScoreMismatch { score: i32, sum: i32 },

    #[error("opponent score {stored:?} does not match the rounds ({expected:?})")]
    OpponentScoreMismatch {
        stored: Option<i32>,
        expected: Option<i32>,
    },

    #[error("outcome {outcome} does not match the final totals of a {mode} session")]
    OutcomeMismatch { outcome: Outcome, mode: GameMode },
}

/// Stored floats go through JSON and `REAL` columns; allow for the last bit.
const FLOAT_TOLERANCE: f64 = 1e-9;

/// Everything a summary derives from its rounds.
struct Totals {
    score: i32,
    opponent_score: Option<i32>,
    accuracy: f64,
    average_response_secs: f64,
    outcome: Outcome,
}

impl Totals {
    fn from_rounds(mode: GameMode, rounds: &[Round]) -> Self {
        let mut correct = 0_u32;
        let mut correct_time = 0.0_f64;
        for round in rounds.iter().filter(|round| round.is_correct()) {
            correct += 1;
            correct_time += round.time_taken_secs();
        }

        let total = u32::try_from(rounds.len()).unwrap_or(u32::MAX).max(1);
        let accuracy = f64::from(correct) / f64::from(total) * 100.0;
        let average_response_secs = if correct == 0 {
            0.0
        } else {
            correct_time / f64::from(correct)
        };

        let score = rounds.iter().map(Round::score_delta).sum();
        let opponent_score = mode
            .has_opponent()
            .then(|| rounds.iter().map(Round::opponent_delta).sum());
        let outcome = Outcome::decide(mode, score, opponent_score.unwrap_or(0));

        Self {
            score,
            opponent_score,
            accuracy,
            average_response_secs,
            outcome,
        }
    }
}

fn close_enough(stored: f64, expected: f64) -> bool {
    (stored - expected).abs() <= FLOAT_TOLERANCE * expected.abs().max(1.0)
}

/// Error type for parsing an `Outcome` from its label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown outcome: {raw}")]
pub struct ParseOutcomeError {
    raw: String,
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Result label shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Solo sessions have no winner.
    Completed,
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Solo always completes; otherwise compare final totals.
    #[must_use]
    pub fn decide(mode: GameMode, player_score: i32, opponent_score: i32) -> Self {
        if !mode.has_opponent() {
            return Outcome::Completed;
        }
        match player_score.cmp(&opponent_score) {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Loss,
            Ordering::Equal => Outcome::Draw,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "Completed",
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(Outcome::Completed),
            "Win" => Ok(Outcome::Win),
            "Loss" => Ok(Outcome::Loss),
            "Draw" => Ok(Outcome::Draw),
            _ => Err(ParseOutcomeError { raw: s.to_owned() }),
        }
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Stored shape of a summary, checked by [`SessionSummary::from_persisted`].
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSummary {
    pub identity: Identity,
    pub mode: GameMode,
    pub score: i32,
    pub opponent_score: Option<i32>,
    pub accuracy: f64,
    pub average_response_secs: f64,
    pub outcome: Outcome,
    pub opponent_label: Option<String>,
    pub rounds: Vec<Round>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Finalized result of a game, handed to the stats sink and the results view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    identity: Identity,
    mode: GameMode,
    score: i32,
    opponent_score: Option<i32>,
    accuracy: f64,
    average_response_secs: f64,
    outcome: Outcome,
    opponent_label: Option<String>,
    rounds: Vec<Round>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Build a summary from the full list of finalized rounds.
    ///
    /// - accuracy is `correct / total_rounds * 100`
    /// - the average response time only counts correct rounds (`0.0` if none)
    /// - the opponent score is present only for modes with an opponent
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`,
    /// `NoRounds` for an empty session and `RoundCountMismatch` if `rounds` is not
    /// exactly `total_rounds` long.
    pub fn from_rounds(
        identity: Identity,
        mode: GameMode,
        total_rounds: u32,
        rounds: Vec<Round>,
        opponent_label: Option<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if total_rounds == 0 {
            return Err(SessionSummaryError::NoRounds);
        }
        if usize::try_from(total_rounds).ok() != Some(rounds.len()) {
            return Err(SessionSummaryError::RoundCountMismatch {
                expected: total_rounds,
                actual: rounds.len(),
            });
        }

        let Totals {
            score,
            opponent_score,
            accuracy,
            average_response_secs,
            outcome,
        } = Totals::from_rounds(mode, &rounds);

        Ok(Self {
            identity,
            mode,
            score,
            opponent_score,
            accuracy,
            average_response_secs,
            outcome,
            opponent_label,
            rounds,
            started_at,
            completed_at,
        })
    }

    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the stored values are inconsistent with each other.
    pub fn from_persisted(persisted: PersistedSummary) -> Result<Self, SessionSummaryError> {
        let PersistedSummary {
            identity,
            mode,
            score,
            opponent_score,
            accuracy,
            average_response_secs,
            outcome,
            opponent_label,
            rounds,
            started_at,
            completed_at,
        } = persisted;

        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if rounds.is_empty() {
            return Err(SessionSummaryError::NoRounds);
        }
        let expected = Totals::from_rounds(mode, &rounds);
        if expected.score != score {
            return Err(SessionSummaryError::ScoreMismatch {
                score,
                sum: expected.score,
            });
        }
        if expected.opponent_score != opponent_score {
            return Err(SessionSummaryError::OpponentScoreMismatch {
                stored: opponent_score,
                expected: expected.opponent_score,
            });
        }
        if expected.outcome != outcome {
            return Err(SessionSummaryError::OutcomeMismatch { outcome, mode });
        }
        if !close_enough(accuracy, expected.accuracy) {
            return Err(SessionSummaryError::AccuracyMismatch {
                stored: accuracy,
                expected: expected.accuracy,
            });
        }
        if !close_enough(average_response_secs, expected.average_response_secs) {
            return Err(SessionSummaryError::AverageMismatch {
                stored: average_response_secs,
                expected: expected.average_response_secs,
            });
        }

        Ok(Self {
            identity,
            mode,
            score,
            opponent_score,
            accuracy: expected.accuracy,
            average_response_secs: expected.average_response_secs,
            outcome,
            opponent_label,
            rounds,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn opponent_score(&self) -> Option<i32> {
        self.opponent_score
    }

    /// Percentage of correct rounds, `0.0..=100.0`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[must_use]
    pub fn average_response_secs(&self) -> f64 {
        self.average_response_secs
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn opponent_label(&self) -> Option<&str> {
        self.opponent_label.as_deref()
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn correct_rounds(&self) -> usize {
        self.rounds.iter().filter(|round| round.is_correct()).count()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerAnswer;
    use crate::numbers::RoundNumber;
    use crate::opponent::OpponentAttempt;
    use crate::time::fixed_now;

    fn round(index: u32, digits: &str, answer: &str, secs: f64) -> Round {
        Round::close(
            index,
            RoundNumber::parse(digits).unwrap(),
            PlayerAnswer::from_submission(answer),
            secs,
            None,
        )
    }

    fn duel_round(index: u32, answer: &str, opponent_correct: bool) -> Round {
        Round::close(
            index,
            RoundNumber::parse("729").unwrap(),
            PlayerAnswer::from_submission(answer),
            2.0,
            Some(OpponentAttempt::new(opponent_correct, 5.0)),
        )
    }

    #[test]
    fn solo_summary_computes_accuracy_and_average() {
        let now = fixed_now();
        let rounds = vec![
            round(1, "729", "9", 3.0),
            round(2, "48", "3", 5.0),
            round(3, "111", "2", 1.0),
            round(4, "55", "", 4.0),
        ];
        let summary = SessionSummary::from_rounds(
            Identity::new_guest(),
            GameMode::Solo,
            4,
            rounds,
            None,
            now,
            now,
        )
        .unwrap();

        assert_eq!(summary.score(), 10 + 10 - 5 - 1);
        assert_eq!(summary.accuracy(), 50.0);
        assert_eq!(summary.average_response_secs(), 4.0);
        assert_eq!(summary.outcome(), Outcome::Completed);
        assert_eq!(summary.opponent_score(), None);
        assert_eq!(summary.correct_rounds(), 2);
    }

    #[test]
    fn no_correct_rounds_means_zero_average() {
        let now = fixed_now();
        let summary = SessionSummary::from_rounds(
            Identity::new_guest(),
            GameMode::Solo,
            1,
            vec![round(1, "729", "1", 3.0)],
            None,
            now,
            now,
        )
        .unwrap();
        assert_eq!(summary.accuracy(), 0.0);
        assert_eq!(summary.average_response_secs(), 0.0);
    }

    #[test]
    fn duel_outcome_compares_totals() {
        let now = fixed_now();
        let identity = Identity::new_guest();
        let build = |rounds: Vec<Round>| {
            SessionSummary::from_rounds(
                identity.clone(),
                GameMode::Duel,
                2,
                rounds,
                Some("Opponent".into()),
                now,
                now,
            )
            .unwrap()
        };

        let win = build(vec![duel_round(1, "9", false), duel_round(2, "9", true)]);
        assert_eq!(win.score(), 20);
        assert_eq!(win.opponent_score(), Some(5));
        assert_eq!(win.outcome(), Outcome::Win);

        let loss = build(vec![duel_round(1, "1", true), duel_round(2, "9", true)]);
        assert_eq!(loss.outcome(), Outcome::Loss);

        let draw = build(vec![duel_round(1, "9", true), duel_round(2, "9", true)]);
        assert_eq!(draw.outcome(), Outcome::Draw);
        assert_eq!(draw.opponent_label(), Some("Opponent"));
    }

    #[test]
    fn rejects_inconsistent_input() {
        let now = fixed_now();
        let id = Identity::new_guest();
        let err = SessionSummary::from_rounds(
            id.clone(),
            GameMode::Solo,
            2,
            vec![round(1, "729", "9", 3.0)],
            None,
            now,
            now,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::RoundCountMismatch {
                expected: 2,
                actual: 1
            }
        );

        let err = SessionSummary::from_rounds(
            id,
            GameMode::Solo,
            1,
            vec![round(1, "729", "9", 3.0)],
            None,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn persisted_summary_is_validated() {
        let now = fixed_now();
        let base = PersistedSummary {
            identity: "guest_x".parse().unwrap(),
            mode: GameMode::Solo,
            score: 10,
            opponent_score: None,
            accuracy: 100.0,
            average_response_secs: 3.0,
            outcome: Outcome::Completed,
            opponent_label: None,
            rounds: vec![round(1, "729", "9", 3.0)],
            started_at: now,
            completed_at: now,
        };
        assert!(SessionSummary::from_persisted(base.clone()).is_ok());

        let bad_score = PersistedSummary {
            score: 11,
            ..base.clone()
        };
        assert_eq!(
            SessionSummary::from_persisted(bad_score).unwrap_err(),
            SessionSummaryError::ScoreMismatch { score: 11, sum: 10 }
        );

        let bad_outcome = PersistedSummary {
            outcome: Outcome::Win,
            ..base.clone()
        };
        assert!(matches!(
            SessionSummary::from_persisted(bad_outcome).unwrap_err(),
            SessionSummaryError::OutcomeMismatch { .. }
        ));

        let bad_accuracy = PersistedSummary {
            accuracy: 0.0,
            ..base.clone()
        };
        assert_eq!(
            SessionSummary::from_persisted(bad_accuracy).unwrap_err(),
            SessionSummaryError::AccuracyMismatch {
                stored: 0.0,
                expected: 100.0
            }
        );

        let bad_average = PersistedSummary {
            average_response_secs: 42.0,
            ..base.clone()
        };
        assert_eq!(
            SessionSummary::from_persisted(bad_average).unwrap_err(),
            SessionSummaryError::AverageMismatch {
                stored: 42.0,
                expected: 3.0
            }
        );

        let solo_with_opponent = PersistedSummary {
            opponent_score: Some(999),
            ..base
        };
        assert_eq!(
            SessionSummary::from_persisted(solo_with_opponent).unwrap_err(),
            SessionSummaryError::OpponentScoreMismatch {
                stored: Some(999),
                expected: None
            }
        );
    }

    #[test]
    fn persisted_duel_totals_are_recomputed() {
        let now = fixed_now();
        // player 20, opponent 5: a win
        let base = PersistedSummary {
            identity: "guest_x".parse().unwrap(),
            mode: GameMode::Duel,
            score: 20,
            opponent_score: Some(5),
            accuracy: 100.0,
            average_response_secs: 2.0,
            outcome: Outcome::Win,
            opponent_label: Some("Rival".into()),
            rounds: vec![duel_round(1, "9", false), duel_round(2, "9", true)],
            started_at: now,
            completed_at: now,
        };
        let summary = SessionSummary::from_persisted(base.clone()).unwrap();
        assert_eq!(summary.opponent_score(), Some(5));

        let forged_opponent = PersistedSummary {
            opponent_score: Some(999),
            ..base.clone()
        };
        assert_eq!(
            SessionSummary::from_persisted(forged_opponent).unwrap_err(),
            SessionSummaryError::OpponentScoreMismatch {
                stored: Some(999),
                expected: Some(5)
            }
        );

        let forged_outcome = PersistedSummary {
            outcome: Outcome::Loss,
            ..base
        };
        assert_eq!(
            SessionSummary::from_persisted(forged_outcome).unwrap_err(),
            SessionSummaryError::OutcomeMismatch {
                outcome: Outcome::Loss,
                mode: GameMode::Duel
            }
        );
    }

    #[test]
    fn stored_float_noise_is_tolerated() {
        let now = fixed_now();
        let rounds = vec![
            round(1, "729", "9", 1.1),
            round(2, "48", "3", 2.2),
            round(3, "111", "1", 3.0),
        ];
        let built = SessionSummary::from_rounds(
            Identity::new_guest(),
            GameMode::Solo,
            3,
            rounds.clone(),
            None,
            now,
            now,
        )
        .unwrap();
        let reloaded = SessionSummary::from_persisted(PersistedSummary {
            identity: built.identity().clone(),
            mode: GameMode::Solo,
            score: built.score(),
            opponent_score: None,
            accuracy: 200.0 / 3.0,
            average_response_secs: 1.65,
            outcome: Outcome::Completed,
            opponent_label: None,
            rounds,
            started_at: now,
            completed_at: now,
        })
        .unwrap();
        assert_eq!(reloaded, built);
    }
}
