use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Prefix that marks an identifier as a guest rather than a registered user.
pub const GUEST_PREFIX: &str = "guest_";

/// Error type for parsing an identity from string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseIdentityError {
    #[error("identity is empty")]
    Empty,
    #[error("guest identity has no suffix")]
    MissingGuestSuffix,
    #[error("user id must not use the guest prefix: {0}")]
    GuestPrefixedUser(String),
}

/// Identifier of a registered (email or wallet) user.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`
    ///
    /// # Errors
    ///
    /// Returns `ParseIdentityError` if the id is blank or carries the guest prefix.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdentityError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ParseIdentityError::Empty);
        }
        if trimmed.starts_with(GUEST_PREFIX) {
            return Err(ParseIdentityError::GuestPrefixedUser(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a guest player, always `guest_<suffix>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuestId(String);

impl GuestId {
    /// Mint a fresh random guest id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{GUEST_PREFIX}{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Who played a session, as supplied by the identity provider.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Identity {
    Registered(UserId),
    Guest(GuestId),
}

impl Identity {
    /// A new random guest identity.
    #[must_use]
    pub fn new_guest() -> Self {
        Self::Guest(GuestId::generate())
    }

    /// A registered user identity.
    ///
    /// # Errors
    ///
    /// See [`UserId::new`].
    pub fn registered(id: impl Into<String>) -> Result<Self, ParseIdentityError> {
        UserId::new(id).map(Self::Registered)
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Registered(id) => id.as_str(),
            Identity::Guest(id) => id.as_str(),
        }
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuestId({})", self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Registered(id) => write!(f, "Registered({})", id.0),
            Identity::Guest(id) => write!(f, "Guest({})", id.0),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Parsing ───────────────────────────────────────────────────────────────────

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseIdentityError::Empty);
        }
        match s.strip_prefix(GUEST_PREFIX) {
            Some("") => Err(ParseIdentityError::MissingGuestSuffix),
            Some(_) => Ok(Identity::Guest(GuestId(s.to_owned()))),
            None => Ok(Identity::Registered(UserId(s.to_owned()))),
        }
    }
}

impl TryFrom<String> for Identity {
    type Error = ParseIdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        match value {
            Identity::Registered(id) => id.0,
            Identity::Guest(id) => id.0,
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_ids_carry_the_prefix() {
        let guest = Identity::new_guest();
        assert!(guest.is_guest());
        assert!(guest.as_str().starts_with(GUEST_PREFIX));
        assert_ne!(guest, Identity::new_guest());
    }

    #[test]
    fn parse_distinguishes_guest_and_registered() {
        let guest: Identity = "guest_abc123".parse().unwrap();
        assert!(guest.is_guest());

        let user: Identity = "user-42".parse().unwrap();
        assert!(!user.is_guest());
        assert_eq!(user.to_string(), "user-42");
    }

    #[test]
    fn parse_rejects_blank_and_bare_prefix() {
        assert_eq!("  ".parse::<Identity>(), Err(ParseIdentityError::Empty));
        assert_eq!(
            "guest_".parse::<Identity>(),
            Err(ParseIdentityError::MissingGuestSuffix)
        );
    }

    #[test]
    fn registered_ids_cannot_impersonate_guests() {
        assert!(matches!(
            Identity::registered("guest_x"),
            Err(ParseIdentityError::GuestPrefixedUser(_))
        ));
        assert!(Identity::registered("0xabc").is_ok());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: Identity = "guest_1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"guest_1\"");
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
