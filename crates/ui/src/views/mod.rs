mod state;

pub use state::{ViewError, ViewState, view_state_from_result};
