mod progress;
mod recorder;
mod service;
mod ticker;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{SessionError, StatsError};
pub use progress::SessionProgress;
pub use recorder::SessionRecorder;
pub use service::{ActionOutcome, GameSession, IgnoreReason, RoundClosed, TickEvent};
pub use ticker::{SessionTicker, TICK_PERIOD, Tick};
pub use view::{LeaderboardEntry, PlayerStats, SessionHistoryItem, SessionSummaryId, StatsService};
pub use workflow::{FinishedSession, GameLoopService};
