use ladders_core::model::{Identity, ParseIdentityError};

/// Answers "who is playing?" when a finished game is reported.
///
/// The engine never authenticates anyone; a host plugs in whatever account
/// backend it has, or falls back to a guest.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Identity;
}

/// Anonymous player: one `guest_<uuid>` id per provider instance.
#[derive(Debug, Clone)]
pub struct GuestIdentityProvider {
    identity: Identity,
}

impl GuestIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: Identity::new_guest(),
        }
    }
}

impl Default for GuestIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for GuestIdentityProvider {
    fn current_identity(&self) -> Identity {
        self.identity.clone()
    }
}

/// Always reports the same identity, typically a signed-in user.
#[derive(Debug, Clone)]
pub struct FixedIdentityProvider {
    identity: Identity,
}

impl FixedIdentityProvider {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// # Errors
    ///
    /// Returns `ParseIdentityError` for an empty id or one using the guest prefix.
    pub fn registered(user_id: impl Into<String>) -> Result<Self, ParseIdentityError> {
        Ok(Self::new(Identity::registered(user_id)?))
    }
}

impl IdentityProvider for FixedIdentityProvider {
    fn current_identity(&self) -> Identity {
        self.identity.clone()
    }
}
