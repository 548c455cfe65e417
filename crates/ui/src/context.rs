use std::sync::Arc;

use ladders_core::model::Identity;
use services::{AppServices, GameLoopService, IdentityProvider, StatsService};

pub trait UiApp: Send + Sync {
    fn identity(&self) -> Arc<dyn IdentityProvider>;
    fn game_loop(&self) -> Arc<GameLoopService>;
    fn stats(&self) -> Arc<StatsService>;
}

impl UiApp for AppServices {
    fn identity(&self) -> Arc<dyn IdentityProvider> {
        AppServices::identity(self)
    }

    fn game_loop(&self) -> Arc<GameLoopService> {
        AppServices::game_loop(self)
    }

    fn stats(&self) -> Arc<StatsService> {
        AppServices::stats(self)
    }
}

#[derive(Clone)]
pub struct AppContext {
    identity: Arc<dyn IdentityProvider>,
    game_loop: Arc<GameLoopService>,
    stats: Arc<StatsService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            identity: app.identity(),
            game_loop: app.game_loop(),
            stats: app.stats(),
        }
    }

    /// The player the leaderboard and history screens are about.
    #[must_use]
    pub fn current_identity(&self) -> Identity {
        self.identity.current_identity()
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

// This context is provided by the application composition root.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::{Clock, FixedIdentityProvider};
    use ladders_core::time::fixed_now;

    #[test]
    fn context_shares_the_app_services() {
        let identity = Arc::new(FixedIdentityProvider::registered("alice").unwrap());
        let services = AppServices::in_memory(Clock::fixed(fixed_now()), identity);
        let app: Arc<dyn UiApp> = Arc::new(services.clone());
        let ctx = build_app_context(&app);

        assert_eq!(ctx.current_identity().as_str(), "alice");
        assert!(Arc::ptr_eq(&ctx.game_loop(), &services.game_loop()));
        assert!(Arc::ptr_eq(&ctx.stats(), &services.stats()));
    }
}
