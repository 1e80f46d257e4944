//! Per-participant account views.

use std::sync::Arc;

use coffer_common::{
    Amount, Asset, EntityId, PendingResult, Resolvable, Result, SystemError,
};

use crate::access::AccessLevel;
use crate::account::Account;
use crate::balance::{Queryable, Receiver, Settable, Source, Total};

/// An account's functionality from the perspective of a permitted
/// participant.
///
/// The perspective and access level are fixed when the view is created;
/// re-run [`Account::access_as`] after membership changes to observe
/// them. Mutating operations re-check the viewer's own level before
/// delegating to the account: a viewer may only grant or modify access
/// strictly below its own level.
///
/// The view also exposes the five balance capabilities, gated by level:
/// queries at any level, deposits and withdrawals at
/// [`AccessLevel::Member`] and above, direct overwrites at
/// [`AccessLevel::CoOwner`] and above.
#[derive(Debug, Clone)]
pub struct AccountView {
    account: Arc<Account>,
    perspective: EntityId,
    level: AccessLevel,
}

impl AccountView {
    pub(crate) fn new(account: Arc<Account>, perspective: EntityId, level: AccessLevel) -> Self {
        Self {
            account,
            perspective,
            level,
        }
    }

    /// Get the account behind this view.
    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    /// Get the participant whose perspective determines this view.
    pub fn perspective(&self) -> &EntityId {
        &self.perspective
    }

    /// Get the access level of this view.
    pub fn access_level(&self) -> AccessLevel {
        self.level
    }

    /// Check whether this view belongs to an account owner.
    pub fn is_owner(&self) -> bool {
        self.level >= AccessLevel::CoOwner
    }

    /// Check whether this view belongs to one of multiple owners.
    pub fn is_joint_owner(&self) -> bool {
        self.level == AccessLevel::Owner && self.account.owner_count() > 1
    }

    fn denied(&self, reason: &str) -> SystemError {
        SystemError::AccessDenied {
            participant: self.perspective.clone(),
            reason: reason.into(),
        }
    }

    fn require(&self, level: AccessLevel, action: &str) -> Result<()> {
        if self.level >= level {
            Ok(())
        } else {
            Err(self.denied(&format!("cannot {action} at this access level")))
        }
    }

    /// Add a participant to the account from the context of this view.
    pub fn add_member(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> Result<AccessLevel> {
        if !self.is_owner() {
            return Err(self.denied("cannot add participants"));
        }
        if let Some(level) = level {
            if level >= self.level {
                return Err(self.denied("cannot grant access at the requested level"));
            }
        }
        self.account.add(participant, level)
    }

    /// Set a participant's access level from the context of this view.
    pub fn set_access(
        &self,
        participant: &dyn Resolvable,
        level: AccessLevel,
    ) -> Result<AccessLevel> {
        if !self.is_owner() {
            return Err(self.denied("cannot edit others' access"));
        }
        if level >= self.level {
            return Err(self.denied("cannot grant access at the requested level"));
        }
        let current = self.account.access_level(participant)?;
        if current >= self.level {
            return Err(self.denied("cannot modify a participant of equal or higher rank"));
        }
        self.account.set_access_level(participant, Some(level))
    }

    /// Remove a participant from the account from the context of this
    /// view.
    pub fn remove_member(&self, participant: &dyn Resolvable) -> Result<bool> {
        if !self.is_owner() {
            return Err(self.denied("cannot remove participants"));
        }
        let current = self.account.access_level(participant)?;
        if current >= self.level {
            return Err(self.denied("cannot remove a participant of equal or higher rank"));
        }
        self.account.remove(participant)
    }

    /// Add a participant, asynchronously.
    pub fn async_add_member(
        &self,
        participant: &dyn Resolvable,
        level: Option<AccessLevel>,
    ) -> PendingResult<AccessLevel> {
        PendingResult::completed(self.add_member(participant, level))
    }

    /// Set a participant's access level, asynchronously.
    pub fn async_set_access(
        &self,
        participant: &dyn Resolvable,
        level: AccessLevel,
    ) -> PendingResult<AccessLevel> {
        PendingResult::completed(self.set_access(participant, level))
    }

    /// Remove a participant, asynchronously.
    pub fn async_remove_member(&self, participant: &dyn Resolvable) -> PendingResult<bool> {
        PendingResult::completed(self.remove_member(participant))
    }
}

impl Resolvable for AccountView {
    fn entity_id(&self) -> EntityId {
        self.perspective.clone()
    }
}

impl Queryable for AccountView {
    fn has(&self, amount: &Amount) -> Result<bool> {
        self.account.funds().has(amount)
    }
}

impl Receiver for AccountView {
    fn give(&self, amount: &Amount) -> Result<()> {
        self.require(AccessLevel::Member, "deposit")?;
        self.account.funds().give(amount)
    }
}

impl Settable for AccountView {
    fn set(&self, amount: &Amount) -> Result<()> {
        self.require(AccessLevel::CoOwner, "set balances")?;
        self.account.funds().set(amount)
    }
}

impl Source for AccountView {
    fn take(&self, amount: &Amount) -> Result<()> {
        self.require(AccessLevel::Member, "withdraw")?;
        self.account.funds().take(amount)
    }
}

impl Total for AccountView {
    fn total(&self, asset: &Asset) -> Result<Option<Amount>> {
        self.account.funds().total(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn participant(key: &str) -> EntityId {
        EntityId::new("player", key).unwrap()
    }

    fn account_with_owner(owner: &EntityId) -> Arc<Account> {
        let funds = Arc::new(MemoryStore::new(EntityId::new("account", "vault").unwrap()));
        Arc::new(
            Account::new(
                "vault",
                EntityId::new("custodian", "first-bank").unwrap(),
                funds,
                owner,
            )
            .unwrap(),
        )
    }

    fn gold_amount(quantity: i64) -> Amount {
        Amount::new(
            Asset::currency("gold").unwrap(),
            Decimal::from(quantity),
        )
        .unwrap()
    }

    #[test]
    fn test_ownership_predicates() {
        let alice = participant("alice");
        let bob = participant("bob");
        let account = account_with_owner(&alice);
        account.add(&bob, Some(AccessLevel::CoOwner)).unwrap();

        let alice_view = account.access_as(&alice).unwrap();
        let bob_view = account.access_as(&bob).unwrap();
        assert!(alice_view.is_owner());
        assert!(bob_view.is_owner());
        // a co-owner is an owner but never a joint owner
        assert!(!bob_view.is_joint_owner());
        assert!(!alice_view.is_joint_owner());

        account.add(&participant("carol"), Some(AccessLevel::Owner)).unwrap();
        let alice_view = account.access_as(&alice).unwrap();
        assert!(alice_view.is_joint_owner());
    }

    #[test]
    fn test_co_owner_cannot_grant_co_owner_or_owner() {
        let alice = participant("alice");
        let bob = participant("bob");
        let account = account_with_owner(&alice);
        account.add(&bob, Some(AccessLevel::CoOwner)).unwrap();

        let bob_view = account.access_as(&bob).unwrap();
        for level in [AccessLevel::CoOwner, AccessLevel::Owner] {
            let error = bob_view
                .add_member(&participant("dave"), Some(level))
                .unwrap_err();
            assert!(matches!(error, SystemError::AccessDenied { .. }));
        }
        assert_eq!(
            bob_view
                .add_member(&participant("dave"), Some(AccessLevel::Member))
                .unwrap(),
            AccessLevel::Member
        );
    }

    #[test]
    fn test_member_cannot_manage_membership() {
        let alice = participant("alice");
        let bob = participant("bob");
        let account = account_with_owner(&alice);
        account.add(&bob, None).unwrap();

        let bob_view = account.access_as(&bob).unwrap();
        assert!(matches!(
            bob_view.add_member(&participant("eve"), None).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
        assert!(matches!(
            bob_view.remove_member(&alice).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
    }

    #[test]
    fn test_co_owner_cannot_demote_owner() {
        let alice = participant("alice");
        let bob = participant("bob");
        let account = account_with_owner(&alice);
        account.add(&bob, Some(AccessLevel::CoOwner)).unwrap();

        let bob_view = account.access_as(&bob).unwrap();
        let error = bob_view.set_access(&alice, AccessLevel::Member).unwrap_err();
        assert!(matches!(error, SystemError::AccessDenied { .. }));
    }

    #[test]
    fn test_set_access_on_absent_participant() {
        let alice = participant("alice");
        let account = account_with_owner(&alice);
        let alice_view = account.access_as(&alice).unwrap();
        assert!(matches!(
            alice_view
                .set_access(&participant("ghost"), AccessLevel::Viewer)
                .unwrap_err(),
            SystemError::NotAnAccountParticipant { .. }
        ));
    }

    #[test]
    fn test_balance_operations_gated_by_level() {
        let alice = participant("alice");
        let vera = participant("vera");
        let account = account_with_owner(&alice);
        account.add(&vera, Some(AccessLevel::Viewer)).unwrap();

        let owner_view = account.access_as(&alice).unwrap();
        owner_view.give(&gold_amount(100)).unwrap();
        owner_view.take(&gold_amount(40)).unwrap();
        owner_view.set(&gold_amount(75)).unwrap();

        let viewer_view = account.access_as(&vera).unwrap();
        assert!(viewer_view.has(&gold_amount(75)).unwrap());
        assert_eq!(
            viewer_view
                .total(&Asset::currency("gold").unwrap())
                .unwrap()
                .unwrap(),
            gold_amount(75)
        );
        assert!(matches!(
            viewer_view.give(&gold_amount(1)).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
        assert!(matches!(
            viewer_view.take(&gold_amount(1)).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
        assert!(matches!(
            viewer_view.set(&gold_amount(1)).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
    }

    #[test]
    fn test_member_cannot_set_balances() {
        let alice = participant("alice");
        let bob = participant("bob");
        let account = account_with_owner(&alice);
        account.add(&bob, None).unwrap();

        let bob_view = account.access_as(&bob).unwrap();
        bob_view.give(&gold_amount(10)).unwrap();
        assert!(matches!(
            bob_view.set(&gold_amount(0)).unwrap_err(),
            SystemError::AccessDenied { .. }
        ));
    }

    #[test]
    fn test_view_resolves_to_perspective() {
        let alice = participant("alice");
        let account = account_with_owner(&alice);
        let view = account.access_as(&alice).unwrap();
        assert_eq!(view.entity_id(), alice);
    }
}
