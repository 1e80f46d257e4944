//! Coffer Ledger
//!
//! The balance protocol (five independently composable capabilities),
//! a concurrent in-memory store, and access-controlled accounts with
//! per-participant views.

pub mod access;
pub mod account;
pub mod balance;
pub mod custodian;
pub mod record;
pub mod store;
pub mod view;

pub use access::AccessLevel;
pub use account::Account;
pub use balance::{Balance, Queryable, Receiver, Settable, Source, SourceReceiver, Total};
pub use custodian::{Custodian, MemoryCustodian};
pub use record::{Operation, TransactionLog, TransactionRecord};
pub use store::{MemoryStore, StoreConfig};
pub use view::AccountView;
