use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ladders_core::model::{GameMode, Identity, Outcome, SessionSummary};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored summary together with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// One leaderboard line: a player's best game plus totals.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub identity: Identity,
    pub best_score: i32,
    pub games_played: u32,
    pub average_accuracy: f64,
}

/// Lifetime totals for one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStatsRow {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub best_score: Option<i32>,
    pub total_score: i64,
    pub average_accuracy: f64,
    /// Mean of per-game averages, over games with at least one correct round.
    pub average_response_secs: f64,
}

impl PlayerStatsRow {
    /// Fold a player's summaries into totals.
    #[must_use]
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a SessionSummary>) -> Self {
        let mut stats = Self::default();
        let mut accuracy_sum = 0.0;
        let mut response_sum = 0.0;
        let mut response_games = 0_u32;

        for summary in summaries {
            stats.games_played += 1;
            match summary.outcome() {
                Outcome::Win => stats.wins += 1,
                Outcome::Loss => stats.losses += 1,
                Outcome::Draw => stats.draws += 1,
                Outcome::Completed => {}
            }
            stats.best_score = Some(
                stats
                    .best_score
                    .map_or(summary.score(), |best| best.max(summary.score())),
            );
            stats.total_score += i64::from(summary.score());
            accuracy_sum += summary.accuracy();
            if summary.correct_rounds() > 0 {
                response_sum += summary.average_response_secs();
                response_games += 1;
            }
        }

        if stats.games_played > 0 {
            stats.average_accuracy = accuracy_sum / f64::from(stats.games_played);
        }
        if response_games > 0 {
            stats.average_response_secs = response_sum / f64::from(response_games);
        }
        stats
    }
}

/// Order leaderboard rows: best score, then games played, then identity.
pub(crate) fn compare_leaderboard_rows(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.best_score
        .cmp(&a.best_score)
        .then_with(|| b.games_played.cmp(&a.games_played))
        .then_with(|| a.identity.as_str().cmp(b.identity.as_str()))
}

/// Repository contract for finished game summaries.
#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// Persist a summary and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// Fetch a summary by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// A player's summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    async fn list_summary_rows(
        &self,
        identity: &Identity,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError>;

    /// Like [`list_summary_rows`](Self::list_summary_rows) without the ids.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    async fn list_summaries(
        &self,
        identity: &Identity,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let rows = self
            .list_summary_rows(identity, completed_from, limit)
            .await?;
        Ok(rows.into_iter().map(|r| r.summary).collect())
    }

    /// Top players by best score, optionally restricted to one mode.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn leaderboard(
        &self,
        mode: Option<GameMode>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError>;

    /// Lifetime totals for one player; all zeros if they never finished a game.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn player_stats(&self, identity: &Identity) -> Result<PlayerStatsRow, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    summaries: Arc<Mutex<Vec<SessionSummaryRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            summaries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("summary id overflow".into()))?
            + 1;
        guard.push(SessionSummaryRow::new(id, summary.clone()));
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.summary.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_summary_rows(
        &self,
        identity: &Identity,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<SessionSummaryRow> = guard
            .iter()
            .filter(|row| row.summary.identity() == identity)
            .filter(|row| completed_from.is_none_or(|from| row.summary.completed_at() >= from))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn leaderboard(
        &self,
        mode: Option<GameMode>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut per_player: HashMap<&Identity, Vec<&SessionSummary>> = HashMap::new();
        for row in guard
            .iter()
            .filter(|row| mode.is_none_or(|mode| row.summary.mode() == mode))
        {
            per_player
                .entry(row.summary.identity())
                .or_default()
                .push(&row.summary);
        }

        let mut rows: Vec<LeaderboardRow> = per_player
            .into_iter()
            .map(|(identity, games)| {
                let stats = PlayerStatsRow::from_summaries(games);
                LeaderboardRow {
                    identity: identity.clone(),
                    best_score: stats.best_score.unwrap_or_default(),
                    games_played: stats.games_played,
                    average_accuracy: stats.average_accuracy,
                }
            })
            .collect();
        rows.sort_by(compare_leaderboard_rows);
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn player_stats(&self, identity: &Identity) -> Result<PlayerStatsRow, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(PlayerStatsRow::from_summaries(
            guard
                .iter()
                .map(|row| &row.summary)
                .filter(|summary| summary.identity() == identity),
        ))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub session_summaries: Arc<dyn SessionSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let session_summaries: Arc<dyn SessionSummaryRepository> =
            Arc::new(InMemoryRepository::new());
        Self { session_summaries }
    }
}
