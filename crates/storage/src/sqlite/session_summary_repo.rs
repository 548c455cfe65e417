use chrono::{DateTime, Utc};
use ladders_core::model::{GameMode, Identity, SessionSummary};

use super::SqliteRepository;
use super::mapping::{
    map_leaderboard_row, map_player_stats_row, map_summary_row, map_summary_row_with_id,
    rounds_to_json,
};
use crate::repository::{
    LeaderboardRow, PlayerStatsRow, SessionSummaryRepository, SessionSummaryRow, StorageError,
};

const SUMMARY_COLUMNS: &str = r"
    id, identity, mode, score, opponent_score, accuracy, average_response_secs,
    outcome, opponent_label, total_rounds, rounds_json, started_at, completed_at
";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let rounds_json = rounds_to_json(summary.rounds())?;
        let total_rounds = i64::try_from(summary.rounds().len())
            .map_err(|_| StorageError::Serialization("total_rounds overflow".into()))?;
        let correct_rounds = i64::try_from(summary.correct_rounds())
            .map_err(|_| StorageError::Serialization("correct_rounds overflow".into()))?;

        let res = sqlx::query(
            r"
                INSERT INTO game_sessions (
                    identity, is_guest, mode, score, opponent_score, accuracy,
                    average_response_secs, outcome, opponent_label, total_rounds,
                    correct_rounds, rounds_json, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ",
        )
        .bind(summary.identity().as_str())
        .bind(summary.identity().is_guest())
        .bind(summary.mode().as_str())
        .bind(i64::from(summary.score()))
        .bind(summary.opponent_score().map(i64::from))
        .bind(summary.accuracy())
        .bind(summary.average_response_secs())
        .bind(summary.outcome().as_str())
        .bind(summary.opponent_label())
        .bind(total_rounds)
        .bind(correct_rounds)
        .bind(rounds_json)
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = res.last_insert_rowid();
        log::debug!(
            "stored {} session {id} for {}",
            summary.mode(),
            summary.identity()
        );
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM game_sessions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summary_rows(
        &self,
        identity: &Identity,
        completed_from: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let mut sql = format!("SELECT {SUMMARY_COLUMNS} FROM game_sessions WHERE identity = ?1");

        let mut bind_index = 2;
        if completed_from.is_some() {
            sql.push_str(" AND completed_at >= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql).bind(identity.as_str());
        if let Some(from) = completed_from {
            query = query.bind(from);
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }

        Ok(out)
    }

    async fn leaderboard(
        &self,
        mode: Option<GameMode>,
        limit: u32,
    ) -> Result<Vec<LeaderboardRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT
                    identity,
                    MAX(score) AS best_score,
                    COUNT(*) AS games_played,
                    AVG(accuracy) AS average_accuracy
                FROM game_sessions
            ",
        );
        let mut bind_index = 1;
        if mode.is_some() {
            sql.push_str(" WHERE mode = ?1");
            bind_index += 1;
        }
        sql.push_str(" GROUP BY identity");
        sql.push_str(" ORDER BY best_score DESC, games_played DESC, identity ASC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(mode) = mode {
            query = query.bind(mode.as_str());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_leaderboard_row).collect()
    }

    async fn player_stats(&self, identity: &Identity) -> Result<PlayerStatsRow, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    COUNT(*) AS games_played,
                    COALESCE(SUM(CASE WHEN outcome = 'Win' THEN 1 ELSE 0 END), 0) AS wins,
                    COALESCE(SUM(CASE WHEN outcome = 'Loss' THEN 1 ELSE 0 END), 0) AS losses,
                    COALESCE(SUM(CASE WHEN outcome = 'Draw' THEN 1 ELSE 0 END), 0) AS draws,
                    MAX(score) AS best_score,
                    COALESCE(SUM(score), 0) AS total_score,
                    COALESCE(AVG(accuracy), 0.0) AS average_accuracy,
                    COALESCE(
                        AVG(CASE WHEN correct_rounds > 0 THEN average_response_secs END),
                        0.0
                    ) AS average_response_secs
                FROM game_sessions
                WHERE identity = ?1
            ",
        )
        .bind(identity.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        map_player_stats_row(&row)
    }
}
