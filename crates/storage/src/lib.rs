#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, LeaderboardRow, PlayerStatsRow, SessionSummaryRepository,
    SessionSummaryRow, Storage, StorageError,
};
