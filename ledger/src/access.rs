//! Account access levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A level of account access, totally ordered from least to most
/// privileged.
///
/// What actions a level permits is decided at the points that gate them
/// (see [`AccountView`](crate::view::AccountView)); the ordering itself
/// is the contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    /// View-only access: balance queries.
    Viewer,
    /// Ordinary access: queries plus deposits and withdrawals.
    Member,
    /// Meta-permissions over viewers and members, but not over owners or
    /// other co-owners.
    CoOwner,
    /// Full access, including management of co-owners and other owners.
    Owner,
}

impl AccessLevel {
    /// The level assigned when none is specified.
    pub const DEFAULT: AccessLevel = AccessLevel::Member;

    /// Get the name of this access level.
    pub fn name(&self) -> &'static str {
        match self {
            AccessLevel::Viewer => "viewer",
            AccessLevel::Member => "member",
            AccessLevel::CoOwner => "co-owner",
            AccessLevel::Owner => "owner",
        }
    }

    /// Get an access level by name, if it matches one.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            AccessLevel::Viewer,
            AccessLevel::Member,
            AccessLevel::CoOwner,
            AccessLevel::Owner,
        ]
        .into_iter()
        .find(|level| level.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
