use std::ops::ControlFlow;
use std::sync::Arc;

use ladders_core::numbers::NumberSource;
use ladders_core::opponent::OpponentSource;
use ladders_core::{GameConfig, Phase};
use services::{
    ActionOutcome, GameLoopService, GameSession, SessionError, SessionTicker, Tick, TickEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::routes::{Navigator, Route};
use crate::vm::{GameVm, ResultsVm};

/// Everything that can change a live game, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Tick(Tick),
    Submit { round_index: u32, answer: String },
    Skip { round_index: u32 },
    Exit,
    PlayAgain,
}

/// Cloneable sender for player intents; safe to hand to input widgets.
#[derive(Clone)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl HostHandle {
    /// Returns `false` once the host is gone.
    pub fn submit(&self, round_index: u32, answer: impl Into<String>) -> bool {
        self.send(HostEvent::Submit {
            round_index,
            answer: answer.into(),
        })
    }

    pub fn skip(&self, round_index: u32) -> bool {
        self.send(HostEvent::Skip { round_index })
    }

    pub fn exit(&self) -> bool {
        self.send(HostEvent::Exit)
    }

    pub fn play_again(&self) -> bool {
        self.send(HostEvent::PlayAgain)
    }

    fn send(&self, event: HostEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Owns one game at a time and serializes ticks and intents onto one queue.
pub struct GameHost {
    game_loop: Arc<GameLoopService>,
    navigator: Navigator,
    tx: mpsc::UnboundedSender<HostEvent>,
    rx: mpsc::UnboundedReceiver<HostEvent>,
    ticker: SessionTicker<HostEvent>,
    config: Option<GameConfig>,
    session: Option<GameSession>,
    results: Option<ResultsVm>,
    report: Option<JoinHandle<()>>,
}

impl GameHost {
    #[must_use]
    pub fn new(game_loop: Arc<GameLoopService>, navigator: Navigator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = SessionTicker::new(tx.clone(), HostEvent::Tick);
        Self {
            game_loop,
            navigator,
            tx,
            rx,
            ticker,
            config: None,
            session: None,
            results: None,
            report: None,
        }
    }

    #[must_use]
    pub fn handle(&self) -> HostHandle {
        HostHandle {
            tx: self.tx.clone(),
        }
    }

    /// Start a game with random sources and show the game screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` while another game is running, or
    /// `SessionError::Config` for out-of-range settings.
    pub fn enter(&mut self, config: GameConfig) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let session = self.game_loop.start_session(config.clone())?;
        self.begin(config, session);
        Ok(())
    }

    /// Like [`GameHost::enter`] with injected number and opponent sources.
    ///
    /// # Errors
    ///
    /// Same as [`GameHost::enter`].
    pub fn enter_with(
        &mut self,
        config: GameConfig,
        numbers: Box<dyn NumberSource>,
        opponent: Box<dyn OpponentSource>,
    ) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let session = self
            .game_loop
            .start_session_with(config.clone(), numbers, opponent)?;
        self.begin(config, session);
        Ok(())
    }

    /// Drain the event queue until the player exits.
    pub async fn run(&mut self) {
        while let Some(event) = self.rx.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
    }

    /// Apply one event; `Break` after `Exit`.
    pub fn handle_event(&mut self, event: HostEvent) -> ControlFlow<()> {
        match event {
            HostEvent::Tick(tick) => self.on_tick(tick),
            HostEvent::Submit {
                round_index,
                answer,
            } => {
                let outcome = self
                    .session
                    .as_mut()
                    .map(|session| session.submit(round_index, &answer));
                self.after_action(outcome);
            }
            HostEvent::Skip { round_index } => {
                let outcome = self
                    .session
                    .as_mut()
                    .map(|session| session.skip(round_index));
                self.after_action(outcome);
            }
            HostEvent::PlayAgain => self.play_again(),
            HostEvent::Exit => {
                self.exit();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Snapshot of the running or just-finished game.
    #[must_use]
    pub fn vm(&self) -> Option<GameVm> {
        self.session.as_ref().map(GameVm::from_session)
    }

    #[must_use]
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn results(&self) -> Option<&ResultsVm> {
        self.results.as_ref()
    }

    /// The background write of the last finished game, if one was spawned.
    pub fn take_report(&mut self) -> Option<JoinHandle<()>> {
        self.report.take()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match &self.session {
            Some(session) if !session.is_finished() => Err(SessionError::InProgress),
            _ => Ok(()),
        }
    }

    fn begin(&mut self, config: GameConfig, session: GameSession) {
        log::info!(
            "entering {} game of {} rounds",
            config.mode(),
            config.total_rounds()
        );
        self.config = Some(config);
        self.session = Some(session);
        self.results = None;
        self.ticker.restart();
        (self.navigator)(Route::Game);
    }

    fn on_tick(&mut self, tick: Tick) {
        if !self.ticker.is_current(tick) {
            log::debug!("dropping stale tick (generation {})", tick.generation);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.tick() {
            TickEvent::RoundTimedOut(closed) => self.after_close(closed.next_phase),
            TickEvent::RoundStarted { round_index, .. } => {
                log::debug!("round {round_index} started");
                self.ticker.restart();
            }
            TickEvent::Countdown { .. } | TickEvent::BreakCountdown { .. } => {}
            TickEvent::Idle => self.ticker.cancel(),
        }
    }

    fn after_action(&mut self, outcome: Option<ActionOutcome>) {
        match outcome {
            Some(ActionOutcome::Finalized(closed)) => self.after_close(closed.next_phase),
            Some(ActionOutcome::Ignored(reason)) => log::debug!("player action ignored: {reason:?}"),
            None => log::debug!("player action with no game running"),
        }
    }

    fn after_close(&mut self, next_phase: Phase) {
        if next_phase == Phase::Finished {
            self.finish();
        } else {
            // the break gets its own full countdown
            self.ticker.restart();
        }
    }

    fn finish(&mut self) {
        self.ticker.cancel();
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match self.game_loop.finish_session(session) {
            Ok(finished) => {
                let results = ResultsVm::from_summary(&finished.summary);
                self.results = Some(results.clone());
                self.report = finished.report;
                (self.navigator)(Route::Results(Box::new(results)));
            }
            Err(err) => log::warn!("could not summarise finished game: {err}"),
        }
    }

    fn play_again(&mut self) {
        let Some(config) = self.config.clone() else {
            log::debug!("play again with no previous game");
            return;
        };
        if let Err(err) = self.enter(config) {
            log::warn!("could not start another game: {err}");
        }
    }

    fn exit(&mut self) {
        self.ticker.cancel();
        let abandoned = self.session.take().filter(|session| !session.is_finished());
        if let Some(session) = abandoned {
            log::info!(
                "left {} game after {} of {} rounds; nothing reported",
                session.config().mode(),
                session.rounds().len(),
                session.config().total_rounds()
            );
        }
        (self.navigator)(Route::Home);
    }
}
