use ladders_core::model::{GameMode, Outcome, Round, SessionSummary};
use serde::Serialize;

use crate::vm::time_fmt::{format_datetime, format_delta, format_percent, format_seconds};

/// One row of the round-by-round breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundRowVm {
    pub index: u32,
    pub number: String,
    pub correct_answer: String,
    /// Empty for a blank submit, `skipped` for skips and timeouts.
    pub your_answer: String,
    pub is_correct: bool,
    pub delta_str: String,
    pub time_str: String,
    pub opponent_correct: Option<bool>,
}

impl From<&Round> for RoundRowVm {
    fn from(round: &Round) -> Self {
        Self {
            index: round.index(),
            number: round.number().to_owned(),
            correct_answer: round.correct_answer().to_string(),
            your_answer: round.recorded_answer().to_owned(),
            is_correct: round.is_correct(),
            delta_str: format_delta(round.score_delta()),
            time_str: format_seconds(round.time_taken_secs()),
            opponent_correct: round.opponent().map(|attempt| attempt.correct),
        }
    }
}

/// Everything the results screen shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultsVm {
    pub mode: GameMode,
    pub outcome: Outcome,
    pub headline: &'static str,
    pub score: i32,
    pub opponent_score: Option<i32>,
    pub opponent_label: Option<String>,
    pub accuracy: f64,
    pub accuracy_str: String,
    pub average_response_str: String,
    pub correct_rounds: usize,
    pub total_rounds: usize,
    pub completed_at_str: String,
    pub rounds: Vec<RoundRowVm>,
}

fn headline(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Completed => "Game complete",
        Outcome::Win => "You win!",
        Outcome::Loss => "You lose",
        Outcome::Draw => "It's a draw",
    }
}

impl ResultsVm {
    #[must_use]
    pub fn from_summary(summary: &SessionSummary) -> Self {
        Self {
            mode: summary.mode(),
            outcome: summary.outcome(),
            headline: headline(summary.outcome()),
            score: summary.score(),
            opponent_score: summary.opponent_score(),
            opponent_label: summary.opponent_label().map(str::to_owned),
            accuracy: summary.accuracy(),
            accuracy_str: format_percent(summary.accuracy()),
            average_response_str: format_seconds(summary.average_response_secs()),
            correct_rounds: summary.correct_rounds(),
            total_rounds: summary.rounds().len(),
            completed_at_str: format_datetime(summary.completed_at()),
            rounds: summary.rounds().iter().map(RoundRowVm::from).collect(),
        }
    }
}
