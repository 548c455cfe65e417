use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of the cosmetic pause between rounds, independent of the round timer.
pub const ROUND_BREAK_SECS: u32 = 5;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move from {from} to {to}")]
pub struct PhaseError {
    pub from: Phase,
    pub to: Phase,
}

/// Where a session is in its round cycle.
///
/// ```text
/// ActiveRound ──▶ RoundBreak ──▶ ActiveRound ...
///      │
///      └── final round ──▶ Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ActiveRound,
    RoundBreak,
    Finished,
}

impl Phase {
    /// Whether `next` is reachable from `self` in a single step.
    #[must_use]
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::ActiveRound, Phase::RoundBreak | Phase::Finished)
                | (Phase::RoundBreak, Phase::ActiveRound)
        )
    }

    /// Checked step to `next`.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError` for an edge the round cycle does not have.
    pub fn transition(self, next: Phase) -> Result<Phase, PhaseError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(PhaseError {
                from: self,
                to: next,
            })
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::ActiveRound => "active-round",
            Phase::RoundBreak => "round-break",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 3] = [Phase::ActiveRound, Phase::RoundBreak, Phase::Finished];

    #[test]
    fn reachable_phases() {
        let reachable = |from: Phase| {
            ALL.into_iter()
                .filter(|to| from.can_transition_to(*to))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            reachable(Phase::ActiveRound),
            vec![Phase::RoundBreak, Phase::Finished]
        );
        assert_eq!(reachable(Phase::RoundBreak), vec![Phase::ActiveRound]);
        assert!(reachable(Phase::Finished).is_empty());
    }

    #[test]
    fn invalid_transition_reports_both_ends() {
        let err = Phase::RoundBreak.transition(Phase::Finished).unwrap_err();
        assert_eq!(err.from, Phase::RoundBreak);
        assert_eq!(err.to, Phase::Finished);
        assert_eq!(err.to_string(), "cannot move from round-break to finished");
        assert!(Phase::Finished.is_terminal());
    }
}
