use ladders_core::model::Identity;
use services::{PlayerStats, SessionHistoryItem, SessionSummaryId, StatsService};

use crate::views::ViewError;
use crate::vm::time_fmt::{format_datetime, format_percent, format_seconds};

pub const HISTORY_LIMIT: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRowVm {
    pub id: SessionSummaryId,
    pub mode: String,
    pub outcome: String,
    /// `32` for solo games, `32 - 15` otherwise.
    pub score_str: String,
    pub accuracy_str: String,
    pub completed_at_str: String,
}

impl From<&SessionHistoryItem> for HistoryRowVm {
    fn from(item: &SessionHistoryItem) -> Self {
        let score_str = match item.opponent_score {
            Some(opponent) => format!("{} - {opponent}", item.score),
            None => item.score.to_string(),
        };
        Self {
            id: item.id,
            mode: item.mode.to_string(),
            outcome: item.outcome.to_string(),
            score_str,
            accuracy_str: format_percent(item.accuracy),
            completed_at_str: format_datetime(item.completed_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryVm {
    pub games_played: u32,
    pub record_str: String,
    pub best_score_str: String,
    pub accuracy_str: String,
    pub response_str: String,
    pub rows: Vec<HistoryRowVm>,
}

impl HistoryVm {
    #[must_use]
    pub fn new(stats: &PlayerStats, items: &[SessionHistoryItem]) -> Self {
        Self {
            games_played: stats.games_played,
            record_str: format!("{}W {}L {}D", stats.wins, stats.losses, stats.draws),
            best_score_str: stats
                .best_score
                .map_or_else(|| "-".to_owned(), |best| best.to_string()),
            accuracy_str: format_percent(stats.average_accuracy),
            response_str: format_seconds(stats.average_response_secs),
            rows: items.iter().map(HistoryRowVm::from).collect(),
        }
    }
}

/// Stats and recent games for one player.
///
/// # Errors
///
/// Returns `ViewError::Unknown` if the stats store cannot be read.
pub async fn load_history(stats: &StatsService, identity: &Identity) -> Result<HistoryVm, ViewError> {
    let player = stats
        .player_stats(identity)
        .await
        .map_err(|err| ViewError::from(&err))?;
    let items = stats
        .recent_sessions(identity, HISTORY_LIMIT)
        .await
        .map_err(|err| ViewError::from(&err))?;
    Ok(HistoryVm::new(&player, &items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladders_core::model::{GameMode, Outcome};
    use ladders_core::time::fixed_now;

    #[test]
    fn rows_show_both_scores_for_duels() {
        let stats = PlayerStats {
            games_played: 2,
            wins: 1,
            losses: 0,
            draws: 0,
            best_score: Some(32),
            total_score: 50,
            average_accuracy: 70.0,
            average_response_secs: 4.5,
            win_rate: Some(100.0),
        };
        let items = [
            SessionHistoryItem {
                id: 2,
                mode: GameMode::Duel,
                score: 32,
                opponent_score: Some(15),
                outcome: Outcome::Win,
                accuracy: 80.0,
                average_response_secs: 4.0,
                rounds: 5,
                completed_at: fixed_now(),
            },
            SessionHistoryItem {
                id: 1,
                mode: GameMode::Solo,
                score: 18,
                opponent_score: None,
                outcome: Outcome::Completed,
                accuracy: 60.0,
                average_response_secs: 4.5,
                rounds: 5,
                completed_at: fixed_now(),
            },
        ];

        let vm = HistoryVm::new(&stats, &items);
        assert_eq!(vm.record_str, "1W 0L 0D");
        assert_eq!(vm.best_score_str, "32");
        assert_eq!(vm.response_str, "4.5s");
        assert_eq!(vm.rows[0].score_str, "32 - 15");
        assert_eq!(vm.rows[0].outcome, "Win");
        assert_eq!(vm.rows[1].score_str, "18");
        assert_eq!(vm.rows[1].mode, "solo");
    }
}
