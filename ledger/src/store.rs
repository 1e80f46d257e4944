//! Concurrent in-memory balance store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

use coffer_common::{Amount, Asset, EntityId, Resolvable, Result, SystemError};

use crate::balance::{Queryable, Receiver, Settable, Source, Total};

/// Store behavior knobs.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum quantity held per asset; unlimited when `None`.
    pub capacity: Option<Decimal>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { capacity: None }
    }
}

/// An in-memory implementation of all five balance capabilities.
///
/// Holdings are keyed per asset; every read-modify-write runs under the
/// asset's map entry, so concurrent `give`/`set`/`take` on the same asset
/// are serialized and `take` can never double-spend.
pub struct MemoryStore {
    entity: EntityId,
    holdings: DashMap<Asset, Decimal>,
    config: StoreConfig,
}

impl MemoryStore {
    /// Create an empty store owned by the given entity.
    pub fn new(entity: EntityId) -> Self {
        Self::with_config(entity, StoreConfig::default())
    }

    /// Create an empty store with explicit configuration.
    pub fn with_config(entity: EntityId, config: StoreConfig) -> Self {
        Self {
            entity,
            holdings: DashMap::new(),
            config,
        }
    }

    /// Number of distinct assets ever held.
    pub fn asset_count(&self) -> usize {
        self.holdings.len()
    }
}

impl Resolvable for MemoryStore {
    fn entity_id(&self) -> EntityId {
        self.entity.clone()
    }
}

impl Queryable for MemoryStore {
    fn has(&self, amount: &Amount) -> Result<bool> {
        let held = self
            .holdings
            .get(amount.asset())
            .map(|quantity| *quantity)
            .unwrap_or(Decimal::ZERO);
        Ok(held >= amount.quantity())
    }
}

impl Receiver for MemoryStore {
    fn give(&self, amount: &Amount) -> Result<()> {
        let mut entry = self
            .holdings
            .entry(amount.asset().clone())
            .or_insert(Decimal::ZERO);
        let updated = *entry + amount.quantity();
        if let Some(capacity) = self.config.capacity {
            if updated > capacity {
                return Err(SystemError::Accept {
                    amount: amount.clone(),
                    reason: format!("capacity {capacity} would be exceeded"),
                });
            }
        }
        *entry = updated;
        debug!(store = %self.entity, %amount, balance = %updated, "credited");
        Ok(())
    }
}

impl Settable for MemoryStore {
    fn set(&self, amount: &Amount) -> Result<()> {
        if let Some(capacity) = self.config.capacity {
            if amount.quantity() > capacity {
                return Err(SystemError::Set {
                    amount: amount.clone(),
                    reason: format!("capacity {capacity} would be exceeded"),
                });
            }
        }
        self.holdings
            .insert(amount.asset().clone(), amount.quantity());
        debug!(store = %self.entity, %amount, "balance set");
        Ok(())
    }
}

impl Source for MemoryStore {
    fn take(&self, amount: &Amount) -> Result<()> {
        match self.holdings.entry(amount.asset().clone()) {
            Entry::Occupied(mut entry) => {
                let held = *entry.get();
                if held < amount.quantity() {
                    return Err(SystemError::Supply {
                        amount: amount.clone(),
                        reason: format!("holds {held}"),
                    });
                }
                let remaining = held - amount.quantity();
                *entry.get_mut() = remaining;
                debug!(store = %self.entity, %amount, balance = %remaining, "debited");
                Ok(())
            }
            Entry::Vacant(_) => {
                if amount.is_zero() {
                    return Ok(());
                }
                Err(SystemError::Supply {
                    amount: amount.clone(),
                    reason: "holds nothing".into(),
                })
            }
        }
    }
}

impl Total for MemoryStore {
    fn total(&self, asset: &Asset) -> Result<Option<Amount>> {
        match self.holdings.get(asset) {
            Some(quantity) => Ok(Some(Amount::new(asset.clone(), *quantity)?)),
            None => Ok(None),
        }
    }
}
