//! Accounts: participant access registries over a backing balance.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use regex::Regex;
use tracing::info;

use coffer_common::{EntityId, PendingResult, Resolvable, Result, SystemError};

use crate::access::AccessLevel;
use crate::balance::Balance;
use crate::view::AccountView;

/// Account IDs are any non-empty string without whitespace.
pub const ID_FORMAT: &str = r"^\S+$";

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ID_FORMAT).expect("id pattern compiles"))
}

/// Assets managed on account with a custodian.
///
/// An account pairs a backing balance store with a registry of
/// participants and their access levels. All participant-map mutations
/// are serialized per account, and the account always retains at least
/// one participant at [`AccessLevel::Owner`].
pub struct Account {
    id: String,
    custodian: EntityId,
    funds: Arc<dyn Balance>,
    participants: RwLock<HashMap<EntityId, AccessLevel>>,
}

impl Account {
    /// Create an account with its initial owner.
    pub fn new(
        id: impl Into<String>,
        custodian: EntityId,
        funds: Arc<dyn Balance>,
        owner: &dyn Resolvable,
    ) -> Result<Self> {
        let id = id.into();
        if !id_regex().is_match(&id) {
            return Err(SystemError::Validation {
                what: "account id",
                input: id,
            });
        }
        let mut participants = HashMap::new();
        participants.insert(owner.entity_id(), AccessLevel::Owner);
        Ok(Self {
            id,
            custodian,
            funds,
            participants: RwLock::new(participants),
        })
    }

    /// Get the ID of this account.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the custodian responsible for this account.
    pub fn custodian(&self) -> &EntityId {
        &self.custodian
    }

    pub(crate) fn funds(&self) -> &Arc<dyn Balance> {
        &self.funds
    }

    /// Access this account from the context of the given participant.
    pub fn access_as(self: &Arc<Self>, participant: &dyn Resolvable) -> Result<AccountView> {
        let id = participant.entity_id();
        let level = self
            .participants
            .read()
            .get(&id)
            .copied()
            .ok_or_else(|| SystemError::AccessDenied {
                participant: id.clone(),
                reason: "not a participant of this account".into(),
            })?;
        Ok(AccountView::new(Arc::clone(self), id, level))
    }

    /// Allow a participant to access this account.
    ///
    /// With no level given, [`AccessLevel::DEFAULT`] is assigned.
    pub fn add(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> Result<AccessLevel> {
        let id = participant.entity_id();
        let mut participants = self.participants.write();
        if participants.contains_key(&id) {
            return Err(SystemError::DuplicateParticipant { participant: id });
        }
        let level = level.unwrap_or(AccessLevel::DEFAULT);
        participants.insert(id.clone(), level);
        info!(account = %self.id, participant = %id, %level, "participant added");
        Ok(level)
    }

    /// Remove a participant from this account.
    ///
    /// Returns whether access was present and removed. Removing the sole
    /// remaining owner fails with
    /// [`SystemError::LastOwner`](coffer_common::SystemError::LastOwner).
    pub fn remove(&self, participant: &dyn Resolvable) -> Result<bool> {
        let id = participant.entity_id();
        let mut participants = self.participants.write();
        match participants.get(&id).copied() {
            None => Ok(false),
            Some(AccessLevel::Owner) => {
                let owners = participants
                    .values()
                    .filter(|level| **level == AccessLevel::Owner)
                    .count();
                if owners <= 1 {
                    return Err(SystemError::LastOwner { participant: id });
                }
                participants.remove(&id);
                info!(account = %self.id, participant = %id, "participant removed");
                Ok(true)
            }
            Some(_) => {
                participants.remove(&id);
                info!(account = %self.id, participant = %id, "participant removed");
                Ok(true)
            }
        }
    }

    /// Get the access level of a participant.
    pub fn access_level(&self, participant: &dyn Resolvable) -> Result<AccessLevel> {
        let id = participant.entity_id();
        self.participants
            .read()
            .get(&id)
            .copied()
            .ok_or(SystemError::NotAnAccountParticipant { participant: id })
    }

    /// Set the access level of a participant.
    ///
    /// Setting `None` resets to [`AccessLevel::DEFAULT`]. This does
    /// **not** remove the participant from the account. Demoting the sole
    /// remaining owner fails with
    /// [`SystemError::LastOwner`](coffer_common::SystemError::LastOwner).
    pub fn set_access_level(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> Result<AccessLevel> {
        let id = participant.entity_id();
        let mut participants = self.participants.write();
        let current = participants
            .get(&id)
            .copied()
            .ok_or_else(|| SystemError::NotAnAccountParticipant {
                participant: id.clone(),
            })?;
        let level = level.unwrap_or(AccessLevel::DEFAULT);
        if current == AccessLevel::Owner && level != AccessLevel::Owner {
            let owners = participants
                .values()
                .filter(|held| **held == AccessLevel::Owner)
                .count();
            if owners <= 1 {
                return Err(SystemError::LastOwner { participant: id });
            }
        }
        participants.insert(id.clone(), level);
        info!(account = %self.id, participant = %id, %level, "access level set");
        Ok(level)
    }

    pub(crate) fn owner_count(&self) -> usize {
        self.participants
            .read()
            .values()
            .filter(|level| **level == AccessLevel::Owner)
            .count()
    }

    /// Access this account from the context of the given participant,
    /// asynchronously.
    pub fn async_access_as(
        self: &Arc<Self>,
        participant: &dyn Resolvable,
    ) -> PendingResult<AccountView> {
        PendingResult::completed(self.access_as(participant))
    }

    /// Allow a participant to access this account, asynchronously.
    pub fn async_add(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> PendingResult<AccessLevel> {
        PendingResult::completed(self.add(participant, level))
    }

    /// Remove a participant from this account, asynchronously.
    pub fn async_remove(&self, participant: &dyn Resolvable) -> PendingResult<bool> {
        PendingResult::completed(self.remove(participant))
    }

    /// Get the access level of a participant, asynchronously.
    pub fn async_access_level(&self, participant: &dyn Resolvable) -> PendingResult<AccessLevel> {
        PendingResult::completed(self.access_level(participant))
    }

    /// Set the access level of a participant, asynchronously.
    pub fn async_set_access_level(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> PendingResult<AccessLevel> {
        PendingResult::completed(self.set_access_level(participant, level))
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl PartialOrd for Account {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Account {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("custodian", &self.custodian)
            .finish()
    }
}
