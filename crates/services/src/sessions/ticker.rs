use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Game timers move in whole seconds.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One timer pulse, stamped with the ticker run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Owns the single live one-second timer task.
///
/// Every `restart` aborts the previous task and bumps the generation, so a
/// tick that was already queued by an older task can be recognised and
/// dropped by the consumer.
pub struct SessionTicker<E> {
    tx: mpsc::UnboundedSender<E>,
    wrap: fn(Tick) -> E,
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl<E: Send + 'static> SessionTicker<E> {
    /// A stopped ticker that will deliver `wrap(tick)` on `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<E>, wrap: fn(Tick) -> E) -> Self {
        Self::with_period(tx, wrap, TICK_PERIOD)
    }

    #[must_use]
    pub fn with_period(tx: mpsc::UnboundedSender<E>, wrap: fn(Tick) -> E, period: Duration) -> Self {
        Self {
            tx,
            wrap,
            period,
            generation: 0,
            task: None,
        }
    }

    /// Stop any running timer and start a fresh one; the first tick arrives one
    /// period from now. Returns the new generation.
    ///
    /// Outside a tokio runtime nothing is spawned and a warning is logged.
    pub fn restart(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let Ok(handle) = Handle::try_current() else {
            log::warn!("no tokio runtime; game timer not started");
            return self.generation;
        };

        let tx = self.tx.clone();
        let wrap = self.wrap;
        let period = self.period;
        let generation = self.generation;
        self.task = Some(handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(wrap(Tick { generation })).is_err() {
                    break;
                }
            }
        }));
        log::debug!("game timer started (generation {generation})");
        self.generation
    }

    /// Abort the running timer, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("game timer cancelled (generation {})", self.generation);
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `tick` came from the timer that is currently running.
    #[must_use]
    pub fn is_current(&self, tick: Tick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<E> Drop for SessionTicker<E> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
