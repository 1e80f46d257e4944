//! Coffer Transactions
//!
//! Composes asynchronous balance operations into multi-step movements:
//! single-asset transfers with take-then-give ordering and best-effort
//! compensation, and two-asset trades built from opposite transfers.

pub mod trade;
pub mod transfer;

pub use trade::{AmountPair, Trade};
pub use transfer::{ReversibleTransaction, ReversibleTransfer, Transaction, Transfer};
