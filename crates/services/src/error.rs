//! Shared error types for the services crate.

use thiserror::Error;

use ladders_core::ConfigError;
use ladders_core::model::SessionSummaryError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("session is still in progress")]
    InProgress,
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
