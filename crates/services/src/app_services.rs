use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::sessions::{GameLoopService, StatsService};

/// Assembles app-facing services over one storage backend and identity provider.
#[derive(Clone)]
pub struct AppServices {
    identity: Arc<dyn IdentityProvider>,
    game_loop: Arc<GameLoopService>,
    stats: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn sqlite(
        db_url: &str,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, identity))
    }

    /// Services over the in-memory repository, for tests and offline play.
    #[must_use]
    pub fn in_memory(clock: Clock, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, identity)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let game_loop = Arc::new(GameLoopService::new(
            clock,
            Arc::clone(&identity),
            Arc::clone(&storage.session_summaries),
        ));
        let stats = Arc::new(StatsService::new(
            clock,
            Arc::clone(&storage.session_summaries),
        ));
        Self {
            identity,
            game_loop,
            stats,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.identity)
    }

    #[must_use]
    pub fn game_loop(&self) -> Arc<GameLoopService> {
        Arc::clone(&self.game_loop)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }
}
