use ladders_core::model::GameMode;
use services::{LeaderboardEntry, StatsService};

use crate::views::ViewError;
use crate::vm::time_fmt::format_percent;

pub const LEADERBOARD_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRowVm {
    pub rank: u32,
    pub player: String,
    pub best_score: i32,
    pub games_played: u32,
    pub accuracy_str: String,
}

impl From<&LeaderboardEntry> for LeaderboardRowVm {
    fn from(entry: &LeaderboardEntry) -> Self {
        let player = if entry.is_guest {
            "Guest".to_owned()
        } else {
            entry.identity.clone()
        };
        Self {
            rank: entry.rank,
            player,
            best_score: entry.best_score,
            games_played: entry.games_played,
            accuracy_str: format_percent(entry.average_accuracy),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardVm {
    pub mode: Option<GameMode>,
    pub title: String,
    pub rows: Vec<LeaderboardRowVm>,
}

impl LeaderboardVm {
    #[must_use]
    pub fn from_entries(mode: Option<GameMode>, entries: &[LeaderboardEntry]) -> Self {
        let title = match mode {
            Some(mode) => format!("Leaderboard: {mode}"),
            None => "Leaderboard".to_owned(),
        };
        Self {
            mode,
            title,
            rows: entries.iter().map(LeaderboardRowVm::from).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// # Errors
///
/// Returns `ViewError::Unknown` if the stats store cannot be read.
pub async fn load_leaderboard(
    stats: &StatsService,
    mode: Option<GameMode>,
) -> Result<LeaderboardVm, ViewError> {
    let entries = stats
        .leaderboard(mode, LEADERBOARD_LIMIT)
        .await
        .map_err(|err| ViewError::from(&err))?;
    Ok(LeaderboardVm::from_entries(mode, &entries))
}
