use ladders_core::model::{
    GameMode, Identity, Outcome, PersistedSummary, Round, SessionSummary,
};
use sqlx::Row;

use crate::repository::{LeaderboardRow, PlayerStatsRow, SessionSummaryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i32_from_i64(field: &'static str, v: i64) -> Result<i32, StorageError> {
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_identity(raw: &str) -> Result<Identity, StorageError> {
    raw.parse::<Identity>().map_err(ser)
}

pub(crate) fn rounds_to_json(rounds: &[Round]) -> Result<String, StorageError> {
    serde_json::to_string(rounds).map_err(ser)
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionSummary, StorageError> {
    let identity = parse_identity(&row.try_get::<String, _>("identity").map_err(ser)?)?;
    let mode: GameMode = row
        .try_get::<String, _>("mode")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let outcome: Outcome = row
        .try_get::<String, _>("outcome")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let score = i32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let opponent_score = row
        .try_get::<Option<i64>, _>("opponent_score")
        .map_err(ser)?
        .map(|v| i32_from_i64("opponent_score", v))
        .transpose()?;
    let rounds_json: String = row.try_get("rounds_json").map_err(ser)?;
    let rounds: Vec<Round> = serde_json::from_str(&rounds_json).map_err(ser)?;

    let total_rounds = u32_from_i64(
        "total_rounds",
        row.try_get::<i64, _>("total_rounds").map_err(ser)?,
    )?;
    if usize::try_from(total_rounds).ok() != Some(rounds.len()) {
        return Err(StorageError::Serialization(format!(
            "total_rounds {total_rounds} does not match {} stored rounds",
            rounds.len()
        )));
    }

    SessionSummary::from_persisted(PersistedSummary {
        identity,
        mode,
        score,
        opponent_score,
        accuracy: row.try_get("accuracy").map_err(ser)?,
        average_response_secs: row.try_get("average_response_secs").map_err(ser)?,
        outcome,
        opponent_label: row.try_get("opponent_label").map_err(ser)?,
        rounds,
        started_at: row.try_get("started_at").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
    .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let summary = map_summary_row(row)?;
    Ok(SessionSummaryRow::new(id, summary))
}

pub(crate) fn map_leaderboard_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LeaderboardRow, StorageError> {
    Ok(LeaderboardRow {
        identity: parse_identity(&row.try_get::<String, _>("identity").map_err(ser)?)?,
        best_score: i32_from_i64("best_score", row.try_get::<i64, _>("best_score").map_err(ser)?)?,
        games_played: u32_from_i64(
            "games_played",
            row.try_get::<i64, _>("games_played").map_err(ser)?,
        )?,
        average_accuracy: row.try_get("average_accuracy").map_err(ser)?,
    })
}

pub(crate) fn map_player_stats_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PlayerStatsRow, StorageError> {
    Ok(PlayerStatsRow {
        games_played: u32_from_i64(
            "games_played",
            row.try_get::<i64, _>("games_played").map_err(ser)?,
        )?,
        wins: u32_from_i64("wins", row.try_get::<i64, _>("wins").map_err(ser)?)?,
        losses: u32_from_i64("losses", row.try_get::<i64, _>("losses").map_err(ser)?)?,
        draws: u32_from_i64("draws", row.try_get::<i64, _>("draws").map_err(ser)?)?,
        best_score: row
            .try_get::<Option<i64>, _>("best_score")
            .map_err(ser)?
            .map(|v| i32_from_i64("best_score", v))
            .transpose()?,
        total_score: row.try_get("total_score").map_err(ser)?,
        average_accuracy: row.try_get("average_accuracy").map_err(ser)?,
        average_response_secs: row.try_get("average_response_secs").map_err(ser)?,
    })
}
