//! Custodians: parties responsible for others' accounts.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use coffer_common::{EntityId, Resolvable};

use crate::account::Account;

/// A point responsible for the safekeeping or management of others'
/// assets, akin to banks, credit unions and brokerage firms.
pub trait Custodian: Resolvable {
    /// Enumerate the accounts the given participant can access with this
    /// custodian.
    fn accounts_for(&self, _participant: &EntityId) -> Vec<Arc<Account>> {
        Vec::new()
    }
}

/// An in-memory custodian keeping its accounts by ID.
pub struct MemoryCustodian {
    entity: EntityId,
    accounts: DashMap<String, Arc<Account>>,
}

impl MemoryCustodian {
    /// Create a custodian with no accounts.
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            accounts: DashMap::new(),
        }
    }

    /// Place an account in this custodian's care.
    ///
    /// Replaces any previous account with the same ID.
    pub fn adopt(&self, account: Arc<Account>) {
        info!(custodian = %self.entity, account = %account.id(), "account adopted");
        self.accounts.insert(account.id().to_string(), account);
    }

    /// Look up an account by ID.
    pub fn account(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id).map(|entry| Arc::clone(&entry))
    }

    /// Number of accounts in this custodian's care.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl Resolvable for MemoryCustodian {
    fn entity_id(&self) -> EntityId {
        self.entity.clone()
    }
}

impl Custodian for MemoryCustodian {
    fn accounts_for(&self, participant: &EntityId) -> Vec<Arc<Account>> {
        self.accounts
            .iter()
            .filter(|entry| entry.value().access_level(participant).is_ok())
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn participant(key: &str) -> EntityId {
        EntityId::new("player", key).unwrap()
    }

    fn bank_id() -> EntityId {
        EntityId::new("custodian", "first-bank").unwrap()
    }

    fn new_account(id: &str, owner: &EntityId) -> Arc<Account> {
        let funds = Arc::new(MemoryStore::new(EntityId::new("account", id).unwrap()));
        Arc::new(Account::new(id, bank_id(), funds, owner).unwrap())
    }

    #[test]
    fn test_accounts_for_lists_only_memberships() {
        let alice = participant("alice");
        let bob = participant("bob");
        let bank = MemoryCustodian::new(bank_id());

        bank.adopt(new_account("vault-a", &alice));
        bank.adopt(new_account("vault-b", &bob));

        let for_alice = bank.accounts_for(&alice);
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].id(), "vault-a");
        assert!(bank.accounts_for(&participant("nobody")).is_empty());
    }

    #[test]
    fn test_account_lookup() {
        let alice = participant("alice");
        let bank = MemoryCustodian::new(bank_id());
        bank.adopt(new_account("vault-a", &alice));

        assert!(bank.account("vault-a").is_some());
        assert!(bank.account("missing").is_none());
        assert_eq!(bank.account_count(), 1);
    }
}
