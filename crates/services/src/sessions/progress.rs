/// Aggregated view of game progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total_rounds: u32,
    pub completed_rounds: u32,
    pub remaining_rounds: u32,
    pub is_finished: bool,
}
