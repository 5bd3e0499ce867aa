//! Admin permissions and the user roster

mod roster;

pub use roster::UserRoster;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque identifier of a messaging-gateway user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| AccessError::InvalidIdentity(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("permission denied")]
    Denied,

    #[error("invalid user id: {0:?}")]
    InvalidIdentity(String),
}

/// Identities allowed to run privileged commands.
///
/// Seeded with one bootstrap admin and only ever grows.
#[derive(Debug, Clone)]
pub struct AdminSet {
    members: FxHashSet<UserId>,
}

impl AdminSet {
    pub fn new(bootstrap: UserId) -> Self {
        let mut members = FxHashSet::default();
        members.insert(bootstrap);
        Self { members }
    }

    pub fn is_admin(&self, id: UserId) -> bool {
        self.members.contains(&id)
    }

    /// Add `target` as an admin on behalf of `acting`, who must already be one
    pub fn grant(&mut self, acting: UserId, target: UserId) -> Result<(), AccessError> {
        if !self.is_admin(acting) {
            return Err(AccessError::Denied);
        }
        self.members.insert(target);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: UserId = UserId(1063257439);

    #[test]
    fn test_bootstrap_member() {
        let admins = AdminSet::new(ROOT);
        assert!(admins.is_admin(ROOT));
        assert!(!admins.is_admin(UserId(7)));
        assert_eq!(admins.len(), 1);
    }

    #[test]
    fn test_grant_by_admin() {
        let mut admins = AdminSet::new(ROOT);
        admins.grant(ROOT, UserId(42)).unwrap();
        assert!(admins.is_admin(UserId(42)));

        // new admins can grant in turn
        admins.grant(UserId(42), UserId(43)).unwrap();
        assert_eq!(admins.len(), 3);
    }

    #[test]
    fn test_grant_by_non_admin_is_denied() {
        let mut admins = AdminSet::new(ROOT);
        assert_eq!(admins.grant(UserId(5), UserId(6)), Err(AccessError::Denied));
        assert!(!admins.is_admin(UserId(6)));
        assert_eq!(admins.len(), 1);
    }

    #[test]
    fn test_is_admin_is_stable() {
        let admins = AdminSet::new(ROOT);
        let first = admins.is_admin(UserId(99));
        for _ in 0..10 {
            assert_eq!(admins.is_admin(UserId(99)), first);
        }
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!("12345".parse::<UserId>(), Ok(UserId(12345)));
        assert_eq!(" -7 ".parse::<UserId>(), Ok(UserId(-7)));
        assert_eq!(
            "abc".parse::<UserId>(),
            Err(AccessError::InvalidIdentity("abc".to_string()))
        );
        assert!("1.5".parse::<UserId>().is_err());
    }
}
