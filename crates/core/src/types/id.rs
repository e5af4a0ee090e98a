//! Newtype ID for type-safe entity references.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a directory user.
///
/// Wraps the uuid the external user directory keys its rows by. The wrapper
/// keeps user IDs from being mixed up with other uuid-shaped values.
///
/// # Example
///
/// ```
/// use pressroom_core::UserId;
///
/// let id: UserId = "0c3ad1a4-5a3e-4a61-9b2c-7d90b6f2a911".parse().unwrap();
/// assert_eq!(id.to_string(), "0c3ad1a4-5a3e-4a61-9b2c-7d90b6f2a911");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new ID from a uuid value.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying uuid value.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let raw = "0c3ad1a4-5a3e-4a61-9b2c-7d90b6f2a911";
        let id: UserId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(id.as_uuid(), Uuid::parse_str(raw).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id: UserId = "0c3ad1a4-5a3e-4a61-9b2c-7d90b6f2a911".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0c3ad1a4-5a3e-4a61-9b2c-7d90b6f2a911\"");

        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
