use chrono::{DateTime, Utc};
use ladders_core::model::{Identity, PlayerAnswer, Round, SessionSummary};
use ladders_core::numbers::{NumberSource, RoundNumber};
use ladders_core::opponent::{OpponentAttempt, OpponentSource};
use ladders_core::phase::{PhaseError, ROUND_BREAK_SECS};
use ladders_core::{GameConfig, Phase};

use super::progress::SessionProgress;
use super::recorder::SessionRecorder;
use crate::error::SessionError;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Why a player action or tick did not change the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Between rounds; nothing is in flight.
    RoundBreak,
    /// The game is over.
    Finished,
    /// The action was addressed to a round that is no longer in flight.
    StaleRound { requested: u32, current: u32 },
    /// The step would leave the round cycle; the session was left as it was.
    IllegalTransition(PhaseError),
}

/// A round that was just finalized, with the totals after it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundClosed {
    pub round: Round,
    pub player_score: i32,
    pub opponent_score: i32,
    /// `RoundBreak`, or `Finished` after the last round.
    pub next_phase: Phase,
}

/// Result of `submit` or `skip`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Finalized(RoundClosed),
    Ignored(IgnoreReason),
}

impl ActionOutcome {
    #[must_use]
    pub fn closed(&self) -> Option<&RoundClosed> {
        match self {
            ActionOutcome::Finalized(closed) => Some(closed),
            ActionOutcome::Ignored(_) => None,
        }
    }
}

/// What a one-second tick did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// The round timer moved; `time_left` is still above zero.
    Countdown { round_index: u32, time_left: u32 },
    /// The round timer hit zero and the round was closed as a timeout.
    RoundTimedOut(RoundClosed),
    /// The break timer moved; `remaining` is still above zero.
    BreakCountdown { remaining: u32 },
    /// The break ended and a new round is in flight.
    RoundStarted { round_index: u32, number: String },
    /// Finished sessions ignore ticks.
    Idle,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct InFlight {
    index: u32,
    number: RoundNumber,
    time_left: u32,
}

#[derive(Debug, Clone)]
enum SessionState {
    Active(InFlight),
    Break { next_index: u32, remaining: u32 },
    Finished,
}

impl SessionState {
    fn phase(&self) -> Phase {
        match self {
            SessionState::Active(_) => Phase::ActiveRound,
            SessionState::Break { .. } => Phase::RoundBreak,
            SessionState::Finished => Phase::Finished,
        }
    }
}

/// The round-based scoring and timing state machine for one game.
///
/// Time only moves through [`tick`](Self::tick): one call is one second. Each
/// round is closed exactly once, by `submit`, `skip` or the timer reaching
/// zero; anything addressed to a closed round is ignored.
pub struct GameSession {
    config: GameConfig,
    numbers: Box<dyn NumberSource>,
    opponent: Box<dyn OpponentSource>,
    recorder: SessionRecorder,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl GameSession {
    /// Validate `config` and put round 1 in flight.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if the configuration is out of bounds.
    pub fn new(
        config: GameConfig,
        mut numbers: Box<dyn NumberSource>,
        opponent: Box<dyn OpponentSource>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let first = InFlight {
            index: 1,
            number: numbers.next_number(),
            time_left: config.time_per_round_secs(),
        };
        log::debug!(
            "{} game: round 1 of {} is {}",
            config.mode(),
            config.total_rounds(),
            first.number
        );
        Ok(Self {
            recorder: SessionRecorder::new(&config),
            config,
            numbers,
            opponent,
            state: SessionState::Active(first),
            started_at,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// 1-based index of the current round; during a break, the round just closed.
    #[must_use]
    pub fn round_index(&self) -> u32 {
        match &self.state {
            SessionState::Active(in_flight) => in_flight.index,
            SessionState::Break { next_index, .. } => next_index - 1,
            SessionState::Finished => self.config.total_rounds(),
        }
    }

    /// The number in flight, if a round is active.
    #[must_use]
    pub fn current_number(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(in_flight) => Some(in_flight.number.as_str()),
            _ => None,
        }
    }

    /// Seconds left on the round timer, if a round is active.
    #[must_use]
    pub fn time_left(&self) -> Option<u32> {
        match &self.state {
            SessionState::Active(in_flight) => Some(in_flight.time_left),
            _ => None,
        }
    }

    /// Seconds left on the break timer, if between rounds.
    #[must_use]
    pub fn break_time_left(&self) -> Option<u32> {
        match self.state {
            SessionState::Break { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        self.recorder.rounds()
    }

    /// The most recently closed round.
    #[must_use]
    pub fn last_round(&self) -> Option<&Round> {
        self.recorder.rounds().last()
    }

    #[must_use]
    pub fn player_score(&self) -> i32 {
        self.recorder.player_total()
    }

    #[must_use]
    pub fn opponent_score(&self) -> i32 {
        self.recorder.opponent_total()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let completed = self.recorder.completed();
        let total = self.config.total_rounds();
        SessionProgress {
            total_rounds: total,
            completed_rounds: completed,
            remaining_rounds: total.saturating_sub(completed),
            is_finished: self.is_finished(),
        }
    }

    /// Answer round `round_index` with the raw text from the answer field.
    ///
    /// Blank input (after trimming) is scored as a blank submit, not ignored.
    pub fn submit(&mut self, round_index: u32, raw_answer: &str) -> ActionOutcome {
        self.close_if_current(round_index, PlayerAnswer::from_submission(raw_answer))
    }

    /// Give up on round `round_index`.
    pub fn skip(&mut self, round_index: u32) -> ActionOutcome {
        self.close_if_current(round_index, PlayerAnswer::Skipped)
    }

    /// Advance every timer by one second.
    pub fn tick(&mut self) -> TickEvent {
        match &mut self.state {
            SessionState::Active(in_flight) => {
                in_flight.time_left = in_flight.time_left.saturating_sub(1);
                if in_flight.time_left > 0 {
                    return TickEvent::Countdown {
                        round_index: in_flight.index,
                        time_left: in_flight.time_left,
                    };
                }
            }
            SessionState::Break { remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining > 0 {
                    return TickEvent::BreakCountdown {
                        remaining: *remaining,
                    };
                }
            }
            SessionState::Finished => return TickEvent::Idle,
        }

        // a timer reached zero
        match &self.state {
            SessionState::Active(in_flight) => {
                let in_flight = in_flight.clone();
                log::debug!("round {} timed out", in_flight.index);
                self.close_round(in_flight, PlayerAnswer::TimedOut)
                    .map_or(TickEvent::Idle, TickEvent::RoundTimedOut)
            }
            SessionState::Break { next_index, .. } => {
                let next_index = *next_index;
                self.start_round(next_index)
            }
            SessionState::Finished => TickEvent::Idle,
        }
    }

    /// Final summary of a finished game.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` before the last round closes, or
    /// `SessionError::Summary` if `completed_at` precedes the start.
    pub fn summary(
        &self,
        identity: Identity,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionSummary, SessionError> {
        if !self.is_finished() {
            return Err(SessionError::InProgress);
        }
        Ok(self
            .recorder
            .finish(identity, self.started_at, completed_at)?)
    }

    fn close_if_current(&mut self, round_index: u32, answer: PlayerAnswer) -> ActionOutcome {
        let reason = match &self.state {
            SessionState::Active(in_flight) if in_flight.index == round_index => {
                let in_flight = in_flight.clone();
                return match self.close_round(in_flight, answer) {
                    Ok(closed) => ActionOutcome::Finalized(closed),
                    Err(err) => ActionOutcome::Ignored(IgnoreReason::IllegalTransition(err)),
                };
            }
            SessionState::Active(in_flight) => IgnoreReason::StaleRound {
                requested: round_index,
                current: in_flight.index,
            },
            SessionState::Break { .. } => IgnoreReason::RoundBreak,
            SessionState::Finished => IgnoreReason::Finished,
        };
        log::debug!("ignored action for round {round_index}: {reason:?}");
        ActionOutcome::Ignored(reason)
    }

    /// Check a step against the round cycle before taking it.
    fn step_to(&self, next: Phase) -> Result<Phase, PhaseError> {
        self.phase().transition(next).inspect_err(|err| {
            log::warn!("{err}; session left in {}", self.phase());
        })
    }

    /// Score `in_flight`, record it and move to the break or to the end.
    fn close_round(
        &mut self,
        in_flight: InFlight,
        answer: PlayerAnswer,
    ) -> Result<RoundClosed, PhaseError> {
        let is_last = in_flight.index >= self.config.total_rounds();
        let next_phase = self.step_to(if is_last {
            Phase::Finished
        } else {
            Phase::RoundBreak
        })?;

        let per_round = self.config.time_per_round_secs();
        let time_taken = match answer {
            PlayerAnswer::TimedOut => f64::from(per_round),
            _ => f64::from(per_round.saturating_sub(in_flight.time_left)),
        };
        let attempt: Option<OpponentAttempt> = self
            .config
            .mode()
            .has_opponent()
            .then(|| self.opponent.attempt(per_round));

        let round = Round::close(in_flight.index, in_flight.number, answer, time_taken, attempt);
        self.recorder.record(round.clone());

        if is_last {
            self.state = SessionState::Finished;
            log::info!(
                "{} game finished: {} to {}",
                self.config.mode(),
                self.recorder.player_total(),
                self.recorder.opponent_total()
            );
        } else {
            self.state = SessionState::Break {
                next_index: in_flight.index + 1,
                remaining: ROUND_BREAK_SECS,
            };
        }
        log::debug!(
            "round {} closed ({:+}), now {next_phase}",
            round.index(),
            round.score_delta()
        );

        Ok(RoundClosed {
            round,
            player_score: self.recorder.player_total(),
            opponent_score: self.recorder.opponent_total(),
            next_phase,
        })
    }

    fn start_round(&mut self, index: u32) -> TickEvent {
        if self.step_to(Phase::ActiveRound).is_err() {
            return TickEvent::Idle;
        }
        let number = self.numbers.next_number();
        let event = TickEvent::RoundStarted {
            round_index: index,
            number: number.as_str().to_owned(),
        };
        log::debug!("round {index} of {} is {number}", self.config.total_rounds());
        self.state = SessionState::Active(InFlight {
            index,
            number,
            time_left: self.config.time_per_round_secs(),
        });
        event
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("player_score", &self.player_score())
            .field("opponent_score", &self.opponent_score())
            .finish_non_exhaustive()
    }
}
