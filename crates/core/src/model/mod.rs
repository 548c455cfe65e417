mod ids;
mod mode;
mod round;
mod summary;

pub use ids::{GUEST_PREFIX, GuestId, Identity, ParseIdentityError, UserId};
pub use mode::{GameMode, ParseModeError};
pub use round::{PlayerAnswer, Round, RoundDataError, SKIPPED_MARKER};
pub use summary::{Outcome, ParseOutcomeError, PersistedSummary, SessionSummary, SessionSummaryError};
