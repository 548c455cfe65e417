use std::sync::Arc;

use crate::vm::ResultsVm;

/// Screens the game host can send the player to.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Home,
    Game,
    /// Carries the finished game so the results screen needs no lookup.
    Results(Box<ResultsVm>),
    Leaderboard,
    History,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Game => "/game",
            Route::Results(_) => "/results",
            Route::Leaderboard => "/leaderboard",
            Route::History => "/history",
        }
    }
}

/// Injected by whatever renders the screens; called on every route change.
pub type Navigator = Arc<dyn Fn(Route) + Send + Sync>;

/// A navigator that drops every route, for headless use.
#[must_use]
pub fn noop_navigator() -> Navigator {
    Arc::new(|_route| {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_stable() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Game.path(), "/game");
        assert_eq!(Route::Leaderboard.path(), "/leaderboard");
        assert_eq!(Route::History.path(), "/history");
    }
}
