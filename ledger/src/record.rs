//! Transaction records for post-commit observers.
//!
//! Observers (logging, event buses) are notified only after an
//! operation's result has resolved; nothing here can alter or veto a
//! committed outcome.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coffer_common::{Amount, Asset, EntityId, Result, SystemError};

/// The action performed in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// A point was checked for an amount.
    Query,
    /// A point was given an amount.
    Give,
    /// An amount was set for a point.
    Set,
    /// An amount was taken from a point.
    Take,
    /// A point was asked for its total of an asset.
    Total,
}

impl Operation {
    /// Name of the capability that performs this operation.
    pub fn capability(&self) -> &'static str {
        match self {
            Operation::Query => "queryable",
            Operation::Give => "receiver",
            Operation::Set => "settable",
            Operation::Take => "source",
            Operation::Total => "total",
        }
    }
}

/// A record of a completed balance action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// The action performed.
    pub operation: Operation,
    /// The asset involved.
    pub asset: Asset,
    /// The amount involved, if the action carried one.
    pub amount: Option<Amount>,
    /// The primary participant or participants.
    pub primaries: Vec<EntityId>,
    /// When the record was created.
    pub recorded_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record.
    ///
    /// When an amount is present it must be an amount of `asset`.
    pub fn new(
        operation: Operation,
        asset: Asset,
        amount: Option<Amount>,
        primaries: Vec<EntityId>,
    ) -> Result<Self> {
        if let Some(amount) = &amount {
            if amount.asset() != &asset {
                return Err(SystemError::Validation {
                    what: "record amount asset",
                    input: amount.asset().to_string(),
                });
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            operation,
            asset,
            amount,
            primaries,
            recorded_at: Utc::now(),
        })
    }
}

/// An append-only in-memory record log.
#[derive(Debug, Default)]
pub struct TransactionLog {
    records: Mutex<Vec<TransactionRecord>>,
}

impl TransactionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn record(&self, record: TransactionRecord) {
        self.records.lock().push(record);
    }

    /// Snapshot the records appended so far.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().clone()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
