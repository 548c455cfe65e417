use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for the current schema.
///
/// Version 1 creates the `game_sessions` table and its lookup indexes.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS game_sessions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    identity TEXT NOT NULL,
                    is_guest INTEGER NOT NULL CHECK (is_guest IN (0, 1)),
                    mode TEXT NOT NULL CHECK (mode IN ('solo', 'duel', 'tournament')),
                    score INTEGER NOT NULL,
                    opponent_score INTEGER,
                    accuracy REAL NOT NULL CHECK (accuracy >= 0 AND accuracy <= 100),
                    average_response_secs REAL NOT NULL CHECK (average_response_secs >= 0),
                    outcome TEXT NOT NULL CHECK (outcome IN ('Completed', 'Win', 'Loss', 'Draw')),
                    opponent_label TEXT,
                    total_rounds INTEGER NOT NULL CHECK (total_rounds > 0),
                    correct_rounds INTEGER NOT NULL CHECK (correct_rounds >= 0),
                    rounds_json TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_game_sessions_identity_completed
                    ON game_sessions (identity, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_game_sessions_mode_score
                    ON game_sessions (mode, score);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!("applied schema migration 1");
    }

    Ok(())
}
