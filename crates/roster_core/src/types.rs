//! Core type definitions for roster.

use std::fmt;
use uuid::Uuid;

/// Stable creation identity of a member.
///
/// Unlike the identifying key (which lives in the member's attributes and
/// may be absent or change), the cid is assigned once when the member is
/// created and never changes. Two member references are the same member
/// exactly when their cids are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cid(Uuid);

impl Cid {
    /// Creates a new random cid.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a cid from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Cid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self.0)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cid:{}", self.0)
    }
}

/// Handle returned when registering an event listener.
///
/// Listener IDs are unique within one event stream and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Creates a new listener ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cid_is_unique() {
        assert_ne!(Cid::new(), Cid::new());
    }

    #[test]
    fn cid_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        assert_eq!(*Cid::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn cid_display() {
        let cid = Cid::from_uuid(Uuid::nil());
        assert_eq!(
            cid.to_string(),
            "cid:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn listener_id_display() {
        assert_eq!(format!("{}", ListenerId::new(7)), "listener:7");
    }
}
