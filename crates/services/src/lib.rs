#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod identity;
pub mod sessions;

pub use ladders_core::Clock;
pub use storage::repository::StorageError;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError, StatsError};
pub use identity::{FixedIdentityProvider, GuestIdentityProvider, IdentityProvider};

pub use sessions::{
    ActionOutcome, FinishedSession, GameLoopService, GameSession, IgnoreReason, LeaderboardEntry,
    PlayerStats, RoundClosed, SessionHistoryItem, SessionProgress, SessionRecorder,
    SessionSummaryId, SessionTicker, StatsService, Tick, TickEvent,
};
