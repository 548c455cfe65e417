use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use ladders_core::model::{GameMode, Identity, Outcome, SessionSummary};
use storage::repository::{LeaderboardRow, PlayerStatsRow, SessionSummaryRepository};

use crate::Clock;
use crate::error::StatsError;

/// Storage identifier for a persisted session summary.
///
/// NOTE: This is currently `i64` to match `SQLite` row IDs.
pub type SessionSummaryId = i64;

/// Presentation-agnostic history item for one finished game.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionHistoryItem {
    pub id: SessionSummaryId,
    pub mode: GameMode,
    pub score: i32,
    pub opponent_score: Option<i32>,
    pub outcome: Outcome,
    pub accuracy: f64,
    pub average_response_secs: f64,
    pub rounds: u32,
    pub completed_at: DateTime<Utc>,
}

impl SessionHistoryItem {
    #[must_use]
    pub fn from_summary(id: SessionSummaryId, summary: &SessionSummary) -> Self {
        Self {
            id,
            mode: summary.mode(),
            score: summary.score(),
            opponent_score: summary.opponent_score(),
            outcome: summary.outcome(),
            accuracy: summary.accuracy(),
            average_response_secs: summary.average_response_secs(),
            rounds: u32::try_from(summary.rounds().len()).unwrap_or(u32::MAX),
            completed_at: summary.completed_at(),
        }
    }
}

/// One ranked leaderboard line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: u32,
    pub identity: String,
    pub is_guest: bool,
    pub best_score: i32,
    pub games_played: u32,
    pub average_accuracy: f64,
}

impl LeaderboardEntry {
    fn from_row(rank: u32, row: &LeaderboardRow) -> Self {
        Self {
            rank,
            identity: row.identity.to_string(),
            is_guest: row.identity.is_guest(),
            best_score: row.best_score,
            games_played: row.games_played,
            average_accuracy: row.average_accuracy,
        }
    }
}

/// Lifetime stats for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub best_score: Option<i32>,
    pub total_score: i64,
    pub average_accuracy: f64,
    pub average_response_secs: f64,
    /// Wins over decided games (wins, losses and draws), in percent.
    pub win_rate: Option<f64>,
}

impl From<PlayerStatsRow> for PlayerStats {
    fn from(row: PlayerStatsRow) -> Self {
        let decided = row.wins + row.losses + row.draws;
        let win_rate = (decided > 0).then(|| f64::from(row.wins) / f64::from(decided) * 100.0);
        Self {
            games_played: row.games_played,
            wins: row.wins,
            losses: row.losses,
            draws: row.draws,
            best_score: row.best_score,
            total_score: row.total_score,
            average_accuracy: row.average_accuracy,
            average_response_secs: row.average_response_secs,
            win_rate,
        }
    }
}

/// Presentation-facing stats facade that hides repositories and time from the UI.
///
/// This service owns:
/// - the time source (`Clock`)
/// - repository access
///
/// It does **not** own UI formatting.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(clock: Clock, summaries: Arc<dyn SessionSummaryRepository>) -> Self {
        Self { clock, summaries }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// A player's most recent games, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` on repository failures.
    pub async fn recent_sessions(
        &self,
        identity: &Identity,
        limit: u32,
    ) -> Result<Vec<SessionHistoryItem>, StatsError> {
        let rows = self
            .summaries
            .list_summary_rows(identity, None, limit)
            .await?;
        Ok(rows
            .iter()
            .map(|row| SessionHistoryItem::from_summary(row.id, &row.summary))
            .collect())
    }

    /// Games completed in the last `days` days, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` on repository failures.
    pub async fn sessions_since_days(
        &self,
        identity: &Identity,
        days: i64,
        limit: u32,
    ) -> Result<Vec<SessionHistoryItem>, StatsError> {
        let from = self.clock.now() - Duration::days(days.max(0));
        let rows = self
            .summaries
            .list_summary_rows(identity, Some(from), limit)
            .await?;
        Ok(rows
            .iter()
            .map(|row| SessionHistoryItem::from_summary(row.id, &row.summary))
            .collect())
    }

    /// Full summary, rounds included, for a results or detail screen.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` (wrapping `StorageError::NotFound` for
    /// unknown ids).
    pub async fn session(&self, id: SessionSummaryId) -> Result<SessionSummary, StatsError> {
        Ok(self.summaries.get_summary(id).await?)
    }

    /// Ranked leaderboard, optionally for a single mode.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` on repository failures.
    pub async fn leaderboard(
        &self,
        mode: Option<GameMode>,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StatsError> {
        let rows = self.summaries.leaderboard(mode, limit).await?;
        Ok(rows
            .iter()
            .zip(1_u32..)
            .map(|(row, rank)| LeaderboardEntry::from_row(rank, row))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `StatsError::Storage` on repository failures.
    pub async fn player_stats(&self, identity: &Identity) -> Result<PlayerStats, StatsError> {
        Ok(self.summaries.player_stats(identity).await?.into())
    }
}
