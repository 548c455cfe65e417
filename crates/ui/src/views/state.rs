use services::{SessionError, StatsError, StorageError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    InvalidSettings,
    GameInProgress,
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::InvalidSettings => "Those game settings are not allowed.",
            ViewError::GameInProgress => "Finish the current game first.",
            ViewError::NotFound => "That game could not be found.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Config(_) => ViewError::InvalidSettings,
            SessionError::InProgress => ViewError::GameInProgress,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&StatsError> for ViewError {
    fn from(err: &StatsError) -> Self {
        match err {
            StatsError::Storage(StorageError::NotFound) => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

#[must_use]
pub fn view_state_from_result<T>(result: Result<T, ViewError>) -> ViewState<T> {
    match result {
        Ok(data) => ViewState::Ready(data),
        Err(err) => ViewState::Error(err),
    }
}
