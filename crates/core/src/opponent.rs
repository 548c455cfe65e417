use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::ScoringPolicy;

/// Probability that the simulated opponent answers a round correctly.
pub const DEFAULT_OPPONENT_ACCURACY: f64 = 0.7;

/// The simulated opponent's result for one round.
///
/// `elapsed_secs` is shown to the player but never affects scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAttempt")]
pub struct OpponentAttempt {
    pub correct: bool,
    pub elapsed_secs: f64,
    pub score_delta: i32,
}

/// A stored opponent delta that disagrees with [`ScoringPolicy`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("opponent delta {stored} does not match the scoring policy ({expected})")]
pub struct OpponentDeltaError {
    pub stored: i32,
    pub expected: i32,
}

#[derive(Deserialize)]
struct StoredAttempt {
    correct: bool,
    elapsed_secs: f64,
    score_delta: i32,
}

impl TryFrom<StoredAttempt> for OpponentAttempt {
    type Error = OpponentDeltaError;

    fn try_from(stored: StoredAttempt) -> Result<Self, Self::Error> {
        let attempt = Self::new(stored.correct, stored.elapsed_secs);
        if attempt.score_delta != stored.score_delta {
            return Err(OpponentDeltaError {
                stored: stored.score_delta,
                expected: attempt.score_delta,
            });
        }
        Ok(attempt)
    }
}

impl OpponentAttempt {
    #[must_use]
    pub fn new(correct: bool, elapsed_secs: f64) -> Self {
        Self {
            correct,
            elapsed_secs,
            score_delta: ScoringPolicy::opponent_delta(correct),
        }
    }
}

/// Decides how the opponent fares each round.
///
/// Only consulted in modes with an opponent, once per closed round, and never
/// told what the player answered.
pub trait OpponentSource: Send {
    fn attempt(&mut self, time_per_round_secs: u32) -> OpponentAttempt;
}

/// Random opponent: correct with probability `accuracy`.
#[derive(Debug, Clone)]
pub struct SimulatedOpponent<R = ChaCha8Rng> {
    rng: R,
    accuracy: f64,
}

impl SimulatedOpponent<ChaCha8Rng> {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_thread_rng() -> Self {
        Self::with_rng(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

impl<R: Rng> SimulatedOpponent<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            accuracy: DEFAULT_OPPONENT_ACCURACY,
        }
    }

    /// Override the hit rate; values outside `[0, 1]` are clamped and NaN
    /// falls back to the default.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = if accuracy.is_nan() {
            DEFAULT_OPPONENT_ACCURACY
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        self
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

impl<R: Rng + Send> OpponentSource for SimulatedOpponent<R> {
    fn attempt(&mut self, time_per_round_secs: u32) -> OpponentAttempt {
        let correct = self.rng.random_bool(self.accuracy);
        let upper = f64::from(time_per_round_secs.saturating_sub(1));
        let elapsed_secs = if upper > 1.0 {
            self.rng.random_range(1.0..upper)
        } else {
            1.0
        };
        OpponentAttempt::new(correct, elapsed_secs)
    }
}

/// Opponent that follows a fixed script of hits and misses, cycling.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    script: Vec<bool>,
    next: usize,
}

impl ScriptedOpponent {
    /// An empty script behaves like `always(true)`.
    #[must_use]
    pub fn new(script: Vec<bool>) -> Self {
        let script = if script.is_empty() { vec![true] } else { script };
        Self { script, next: 0 }
    }

    #[must_use]
    pub fn always(correct: bool) -> Self {
        Self::new(vec![correct])
    }
}

impl OpponentSource for ScriptedOpponent {
    fn attempt(&mut self, time_per_round_secs: u32) -> OpponentAttempt {
        let correct = self.script[self.next % self.script.len()];
        self.next = self.next.wrapping_add(1);
        OpponentAttempt::new(correct, f64::from(time_per_round_secs) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_opponent_hits_about_seventy_percent() {
        let mut opponent = SimulatedOpponent::seeded(11);
        let hits = (0..10_000)
            .filter(|_| opponent.attempt(20).correct)
            .count();
        assert!((6_500..7_500).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn elapsed_time_stays_inside_the_round() {
        let mut opponent = SimulatedOpponent::seeded(3);
        for _ in 0..1_000 {
            let attempt = opponent.attempt(10);
            assert!(attempt.elapsed_secs >= 1.0 && attempt.elapsed_secs < 9.0);
        }
        // degenerate round length still yields a sane value
        assert_eq!(opponent.attempt(2).elapsed_secs, 1.0);
    }

    #[test]
    fn deltas_follow_the_scoring_policy() {
        let mut always_right = SimulatedOpponent::seeded(1).with_accuracy(1.0);
        let mut always_wrong = SimulatedOpponent::seeded(1).with_accuracy(0.0);
        assert_eq!(always_right.attempt(10).score_delta, 10);
        assert_eq!(always_wrong.attempt(10).score_delta, -5);
    }

    #[test]
    fn accuracy_is_clamped() {
        assert_eq!(SimulatedOpponent::seeded(1).with_accuracy(4.0).accuracy(), 1.0);
        assert_eq!(
            SimulatedOpponent::seeded(1).with_accuracy(f64::NAN).accuracy(),
            DEFAULT_OPPONENT_ACCURACY
        );
    }

    #[test]
    fn stored_attempts_must_follow_the_policy() {
        let ok: OpponentAttempt =
            serde_json::from_str(r#"{"correct":false,"elapsed_secs":4.0,"score_delta":-5}"#).unwrap();
        assert_eq!(ok, OpponentAttempt::new(false, 4.0));

        let err = serde_json::from_str::<OpponentAttempt>(
            r#"{"correct":false,"elapsed_secs":4.0,"score_delta":-1}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("opponent delta -1"), "{err}");
    }

    #[test]
    fn scripted_opponent_cycles() {
        let mut opponent = ScriptedOpponent::new(vec![true, false]);
        assert!(opponent.attempt(10).correct);
        assert!(!opponent.attempt(10).correct);
        assert!(opponent.attempt(10).correct);
        assert!(ScriptedOpponent::new(Vec::new()).attempt(10).correct);
    }
}
