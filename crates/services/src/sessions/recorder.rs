use chrono::{DateTime, Utc};
use ladders_core::GameConfig;
use ladders_core::model::{GameMode, Identity, Round, SessionSummary, SessionSummaryError};

/// Append-only log of finalized rounds with running totals.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    mode: GameMode,
    total_rounds: u32,
    opponent_label: Option<String>,
    rounds: Vec<Round>,
    player_total: i32,
    opponent_total: i32,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let capacity = usize::try_from(config.total_rounds()).unwrap_or_default();
        Self {
            mode: config.mode(),
            total_rounds: config.total_rounds(),
            opponent_label: config.opponent_label().map(str::to_owned),
            rounds: Vec::with_capacity(capacity),
            player_total: 0,
            opponent_total: 0,
        }
    }

    /// Append a finalized round and fold its deltas into the totals.
    pub fn record(&mut self, round: Round) {
        self.player_total += round.score_delta();
        self.opponent_total += round.opponent_delta();
        self.rounds.push(round);
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn completed(&self) -> u32 {
        u32::try_from(self.rounds.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed() >= self.total_rounds
    }

    /// Sum of every recorded player delta; may be negative.
    #[must_use]
    pub fn player_total(&self) -> i32 {
        self.player_total
    }

    /// Sum of opponent deltas; stays `0` in solo games.
    #[must_use]
    pub fn opponent_total(&self) -> i32 {
        self.opponent_total
    }

    /// Build the final summary from the recorded rounds.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the round count does not match the
    /// configured total or the timestamps are out of order.
    pub fn finish(
        &self,
        identity: Identity,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionSummary, SessionSummaryError> {
        SessionSummary::from_rounds(
            identity,
            self.mode,
            self.total_rounds,
            self.rounds.clone(),
            self.opponent_label.clone(),
            started_at,
            completed_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladders_core::model::{Outcome, PlayerAnswer};
    use ladders_core::numbers::RoundNumber;
    use ladders_core::opponent::OpponentAttempt;
    use ladders_core::time::fixed_now;

    fn round(index: u32, answer: &str, opponent: Option<bool>) -> Round {
        Round::close(
            index,
            RoundNumber::parse("729").unwrap(),
            PlayerAnswer::from_submission(answer),
            3.0,
            opponent.map(|correct| OpponentAttempt::new(correct, 5.0)),
        )
    }

    #[test]
    fn totals_track_recorded_deltas() {
        let mut recorder = SessionRecorder::new(&GameConfig::new(GameMode::Solo).with_total_rounds(3));
        recorder.record(round(1, "9", None));
        recorder.record(round(2, "4", None));
        recorder.record(round(3, "", None));

        let sum: i32 = recorder.rounds().iter().map(Round::score_delta).sum();
        assert_eq!(recorder.player_total(), sum);
        assert_eq!(recorder.player_total(), 4);
        assert_eq!(recorder.opponent_total(), 0);
        assert!(recorder.is_complete());
    }

    #[test]
    fn opponent_total_moves_only_with_attempts() {
        let mut recorder = SessionRecorder::new(&GameConfig::new(GameMode::Duel).with_total_rounds(2));
        recorder.record(round(1, "9", Some(true)));
        assert_eq!(recorder.opponent_total(), 10);
        recorder.record(round(2, "9", Some(false)));
        assert_eq!(recorder.opponent_total(), 5);

        let summary = recorder
            .finish(Identity::new_guest(), fixed_now(), fixed_now())
            .unwrap();
        assert_eq!(summary.score(), 20);
        assert_eq!(summary.opponent_score(), Some(5));
        assert_eq!(summary.outcome(), Outcome::Win);
        assert_eq!(summary.opponent_label(), Some("Opponent"));
    }

    #[test]
    fn finish_rejects_partial_sessions() {
        let mut recorder = SessionRecorder::new(&GameConfig::new(GameMode::Solo).with_total_rounds(2));
        recorder.record(round(1, "9", None));
        assert!(!recorder.is_complete());
        assert!(matches!(
            recorder.finish(Identity::new_guest(), fixed_now(), fixed_now()),
            Err(SessionSummaryError::RoundCountMismatch { expected: 2, actual: 1 })
        ));
    }
}
