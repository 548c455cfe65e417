use ladders_core::Phase;
use serde::Serialize;
use services::GameSession;

use crate::vm::results_vm::RoundRowVm;
use crate::vm::time_fmt::format_countdown;

/// Render-ready snapshot of a live game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameVm {
    pub phase: Phase,
    pub round_index: u32,
    pub total_rounds: u32,
    /// `Round 2 of 5`.
    pub round_label: String,
    /// Digits to reduce; `None` outside an active round.
    pub number: Option<String>,
    /// Round or break countdown, whichever is running.
    pub countdown_str: Option<String>,
    pub player_score: i32,
    pub opponent_score: Option<i32>,
    pub opponent_label: Option<String>,
    /// Feedback for the round that just closed.
    pub last_round: Option<RoundRowVm>,
}

impl GameVm {
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        let config = session.config();
        let has_opponent = config.mode().has_opponent();
        let countdown = session.time_left().or_else(|| session.break_time_left());
        Self {
            phase: session.phase(),
            round_index: session.round_index(),
            total_rounds: config.total_rounds(),
            round_label: format!("Round {} of {}", session.round_index(), config.total_rounds()),
            number: session.current_number().map(str::to_owned),
            countdown_str: countdown.map(format_countdown),
            player_score: session.player_score(),
            opponent_score: has_opponent.then(|| session.opponent_score()),
            opponent_label: config.opponent_label().map(str::to_owned),
            last_round: session.last_round().map(RoundRowVm::from),
        }
    }

    #[must_use]
    pub fn accepts_answers(&self) -> bool {
        self.phase == Phase::ActiveRound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladders_core::GameConfig;
    use ladders_core::model::GameMode;
    use ladders_core::numbers::ScriptedNumbers;
    use ladders_core::opponent::ScriptedOpponent;
    use ladders_core::time::fixed_now;

    fn session(mode: GameMode) -> GameSession {
        GameSession::new(
            GameConfig::new(mode).with_total_rounds(2).with_time_per_round(10),
            Box::new(ScriptedNumbers::new(["729", "48"]).unwrap()),
            Box::new(ScriptedOpponent::always(true)),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn active_round_shows_number_and_timer() {
        let mut game = session(GameMode::Solo);
        game.tick();
        let vm = GameVm::from_session(&game);
        assert!(vm.accepts_answers());
        assert_eq!(vm.round_label, "Round 1 of 2");
        assert_eq!(vm.number.as_deref(), Some("729"));
        assert_eq!(vm.countdown_str.as_deref(), Some("0:09"));
        assert_eq!(vm.opponent_score, None);
        assert!(vm.last_round.is_none());
    }

    #[test]
    fn break_shows_feedback_for_the_closed_round() {
        let mut game = session(GameMode::Duel);
        game.submit(1, "9");
        let vm = GameVm::from_session(&game);
        assert_eq!(vm.phase, Phase::RoundBreak);
        assert!(!vm.accepts_answers());
        assert_eq!(vm.number, None);
        assert_eq!(vm.countdown_str.as_deref(), Some("0:05"));
        assert_eq!(vm.player_score, 10);
        assert_eq!(vm.opponent_score, Some(10));
        assert_eq!(vm.last_round.unwrap().delta_str, "+10");
    }
}
