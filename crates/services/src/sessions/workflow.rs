use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ladders_core::GameConfig;
use ladders_core::model::SessionSummary;
use ladders_core::numbers::{NumberSource, RandomNumbers};
use ladders_core::opponent::{OpponentSource, SimulatedOpponent};
use storage::repository::SessionSummaryRepository;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::service::GameSession;
use crate::Clock;
use crate::error::SessionError;
use crate::identity::IdentityProvider;

/// A finished game's summary and the handle of its background write.
#[derive(Debug)]
pub struct FinishedSession {
    pub summary: SessionSummary,
    /// `None` when no tokio runtime was available to report on.
    pub report: Option<JoinHandle<()>>,
}

/// Orchestrates session start and fire-and-forget reporting.
#[derive(Clone)]
pub struct GameLoopService {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    summaries: Arc<dyn SessionSummaryRepository>,
    seed: Option<u64>,
    games_started: Arc<AtomicU64>,
}

impl GameLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        summaries: Arc<dyn SessionSummaryRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            summaries,
            seed: None,
            games_started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make every random source derive from `seed`, for replays and demos.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Start a game with random numbers and a simulated opponent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if `config` is out of bounds.
    pub fn start_session(&self, config: GameConfig) -> Result<GameSession, SessionError> {
        let game = self.games_started.fetch_add(1, Ordering::Relaxed);
        let (numbers, opponent): (Box<dyn NumberSource>, Box<dyn OpponentSource>) = match self.seed {
            Some(seed) => {
                // distinct but reproducible streams per game
                let base = seed.wrapping_add(game.wrapping_mul(2));
                (
                    Box::new(RandomNumbers::seeded(base)),
                    Box::new(SimulatedOpponent::seeded(base.wrapping_add(1))),
                )
            }
            None => (
                Box::new(RandomNumbers::from_thread_rng()),
                Box::new(SimulatedOpponent::from_thread_rng()),
            ),
        };
        self.start_session_with(config, numbers, opponent)
    }

    /// Start a game with injected number and opponent sources.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if `config` is out of bounds.
    pub fn start_session_with(
        &self,
        config: GameConfig,
        numbers: Box<dyn NumberSource>,
        opponent: Box<dyn OpponentSource>,
    ) -> Result<GameSession, SessionError> {
        let session = GameSession::new(config, numbers, opponent, self.clock.now())?;
        log::info!(
            "started {} game of {} rounds",
            session.config().mode(),
            session.config().total_rounds()
        );
        Ok(session)
    }

    /// Summarize a finished game for the current player and report it.
    ///
    /// The summary is returned right away; the sink write runs in the
    /// background.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` if the game has not finished.
    pub fn finish_session(&self, session: &GameSession) -> Result<FinishedSession, SessionError> {
        let identity = self.identity.current_identity();
        let summary = session.summary(identity, self.clock.now())?;
        let report = self.report(summary.clone());
        Ok(FinishedSession { summary, report })
    }

    /// Hand `summary` to the stats sink without waiting for it.
    ///
    /// Sink failures are logged and dropped. Returns `None`, after logging a
    /// warning, when called outside a tokio runtime.
    pub fn report(&self, summary: SessionSummary) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            log::warn!(
                "no tokio runtime; {} session for {} was not reported",
                summary.mode(),
                summary.identity()
            );
            return None;
        };

        let summaries = Arc::clone(&self.summaries);
        Some(handle.spawn(async move {
            match summaries.append_summary(&summary).await {
                Ok(id) => log::info!(
                    "reported {} session {id} for {}: {} ({})",
                    summary.mode(),
                    summary.identity(),
                    summary.score(),
                    summary.outcome()
                ),
                Err(err) => log::warn!(
                    "failed to report {} session for {}: {err}",
                    summary.mode(),
                    summary.identity()
                ),
            }
        }))
    }
}
