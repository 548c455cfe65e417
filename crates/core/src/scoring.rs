use crate::model::PlayerAnswer;

/// Fixed point table for a round.
///
/// | Outcome                        | Delta |
/// |--------------------------------|-------|
/// | correct answer                 | +10   |
/// | non-empty wrong answer         | -5    |
/// | blank submit                   | -1    |
/// | skip                           | -1    |
/// | timer ran out                  | -1    |
///
/// The simulated opponent scores +10 when it answers correctly and -5 when it
/// does not, whichever way the player closed the round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringPolicy;

impl ScoringPolicy {
    pub const CORRECT: i32 = 10;
    pub const WRONG: i32 = -5;
    pub const BLANK: i32 = -1;
    pub const SKIP: i32 = -1;
    pub const TIMEOUT: i32 = -1;

    pub const OPPONENT_CORRECT: i32 = 10;
    pub const OPPONENT_WRONG: i32 = -5;

    /// Whether `answer` matches the digital root `correct_answer`.
    #[must_use]
    pub fn is_correct(answer: &PlayerAnswer, correct_answer: u8) -> bool {
        match answer {
            PlayerAnswer::Answered(text) => text.trim() == correct_answer.to_string(),
            PlayerAnswer::Blank | PlayerAnswer::Skipped | PlayerAnswer::TimedOut => false,
        }
    }

    #[must_use]
    pub fn player_delta(answer: &PlayerAnswer, correct_answer: u8) -> i32 {
        match answer {
            PlayerAnswer::Answered(_) if Self::is_correct(answer, correct_answer) => Self::CORRECT,
            PlayerAnswer::Answered(_) => Self::WRONG,
            PlayerAnswer::Blank => Self::BLANK,
            PlayerAnswer::Skipped => Self::SKIP,
            PlayerAnswer::TimedOut => Self::TIMEOUT,
        }
    }

    #[must_use]
    pub fn opponent_delta(correct: bool) -> i32 {
        if correct {
            Self::OPPONENT_CORRECT
        } else {
            Self::OPPONENT_WRONG
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_scores_ten() {
        let answer = PlayerAnswer::from_submission("9");
        assert!(ScoringPolicy::is_correct(&answer, 9));
        assert_eq!(ScoringPolicy::player_delta(&answer, 9), 10);
    }

    #[test]
    fn wrong_answer_costs_five() {
        assert_eq!(
            ScoringPolicy::player_delta(&PlayerAnswer::from_submission("4"), 9),
            -5
        );
        // leading zeros are not the same answer
        assert_eq!(
            ScoringPolicy::player_delta(&PlayerAnswer::from_submission("09"), 9),
            -5
        );
        assert_eq!(
            ScoringPolicy::player_delta(&PlayerAnswer::from_submission("abc"), 9),
            -5
        );
    }

    #[test]
    fn blank_skip_and_timeout_cost_one() {
        assert_eq!(
            ScoringPolicy::player_delta(&PlayerAnswer::from_submission("   "), 9),
            -1
        );
        assert_eq!(ScoringPolicy::player_delta(&PlayerAnswer::Skipped, 9), -1);
        assert_eq!(ScoringPolicy::player_delta(&PlayerAnswer::TimedOut, 9), -1);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let answer = PlayerAnswer::from_submission(" 3 \n");
        assert_eq!(ScoringPolicy::player_delta(&answer, 3), 10);
    }

    #[test]
    fn opponent_penalty_is_consistent() {
        assert_eq!(ScoringPolicy::opponent_delta(true), 10);
        assert_eq!(ScoringPolicy::opponent_delta(false), -5);
    }
}
