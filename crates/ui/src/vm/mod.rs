mod game_vm;
mod history_vm;
mod leaderboard_vm;
mod results_vm;
mod time_fmt;

pub use game_vm::GameVm;
pub use history_vm::{HISTORY_LIMIT, HistoryRowVm, HistoryVm, load_history};
pub use leaderboard_vm::{LEADERBOARD_LIMIT, LeaderboardRowVm, LeaderboardVm, load_leaderboard};
pub use results_vm::{ResultsVm, RoundRowVm};
pub use time_fmt::{format_countdown, format_datetime, format_delta, format_percent, format_seconds};
