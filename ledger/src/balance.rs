//! The balance protocol: five independently composable capabilities.
//!
//! A concrete store implements any subset; [`Balance`] bundles all five
//! for callers that need a full store. Every mutating capability also
//! exposes an asynchronous variant whose default behavior is to execute
//! the synchronous operation eagerly and wrap it — implementations backed
//! by external storage may override it to run off the calling task (see
//! [`PendingResult::spawn`]).

use coffer_common::{Amount, Asset, PendingResult, Resolvable, Result};

/// A point that can be tested for the holding of assets.
pub trait Queryable: Resolvable {
    /// Check for an amount on this point.
    fn has(&self, amount: &Amount) -> Result<bool>;

    /// Check for an amount on this point, asynchronously.
    fn async_has(&self, amount: &Amount) -> PendingResult<bool> {
        PendingResult::completed(self.has(amount))
    }
}

/// A point to which assets can be given.
pub trait Receiver: Resolvable {
    /// Give an amount to this point.
    ///
    /// Fails with [`SystemError::Accept`](coffer_common::SystemError::Accept)
    /// if the point cannot accept the amount.
    fn give(&self, amount: &Amount) -> Result<()>;

    /// Give an amount to this point, asynchronously.
    fn async_give(&self, amount: &Amount) -> PendingResult<()> {
        PendingResult::completed(self.give(amount))
    }
}

/// A point whose amounts can be set directly.
pub trait Settable: Resolvable {
    /// Overwrite the stored quantity of the amount's asset.
    ///
    /// Fails with [`SystemError::Set`](coffer_common::SystemError::Set)
    /// if the point refuses the overwrite.
    fn set(&self, amount: &Amount) -> Result<()>;

    /// Overwrite the stored quantity, asynchronously.
    fn async_set(&self, amount: &Amount) -> PendingResult<()> {
        PendingResult::completed(self.set(amount))
    }
}

/// A point from which assets can be taken.
pub trait Source: Resolvable {
    /// Take an amount from this point.
    ///
    /// Fails with [`SystemError::Supply`](coffer_common::SystemError::Supply)
    /// if the point holds less than the requested amount. The sufficiency
    /// check and the debit are atomic: no concurrent operation on the
    /// same asset observes an intermediate state.
    fn take(&self, amount: &Amount) -> Result<()>;

    /// Take an amount from this point, asynchronously.
    fn async_take(&self, amount: &Amount) -> PendingResult<()> {
        PendingResult::completed(self.take(amount))
    }
}

/// A point that can be queried for its totals of assets.
pub trait Total: Resolvable {
    /// Get the quantity of an asset currently held, or `None` if the
    /// asset was never touched.
    fn total(&self, asset: &Asset) -> Result<Option<Amount>>;

    /// Get the quantity of an asset currently held, asynchronously.
    fn async_total(&self, asset: &Asset) -> PendingResult<Option<Amount>> {
        PendingResult::completed(self.total(asset))
    }
}

/// The union of all five capabilities.
///
/// Prefer bounding on the individual capability traits where a subset
/// suffices; `Balance` is for callers that genuinely need a full store.
pub trait Balance: Queryable + Receiver + Settable + Source + Total {}

impl<T: Queryable + Receiver + Settable + Source + Total + ?Sized> Balance for T {}

/// The capability intersection required of transfer participants: a
/// point that can both provide an amount and accept one back.
pub trait SourceReceiver: Source + Receiver {}

impl<T: Source + Receiver + ?Sized> SourceReceiver for T {}
