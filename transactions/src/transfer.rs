//! Single-asset transfers between two participants.

use std::sync::Arc;

use tracing::{debug, warn};

use coffer_common::{
    Amount, PendingResult, Resolvable, Resolver, SystemError, TransferOutcome,
};
use coffer_ledger::SourceReceiver;

/// A series of actions that must all complete or fail together.
pub trait Transaction {
    /// What a successful run resolves to.
    type Output: Send + Sync + 'static;

    /// Execute the transaction.
    fn execute(&self) -> PendingResult<Self::Output>;
}

/// A transaction that can be reversed after it has been executed.
pub trait ReversibleTransaction: Transaction {
    /// Reverse the transaction.
    fn reverse(&self) -> PendingResult<Self::Output>;
}

/// The transfer of a single asset between two participants.
///
/// Execution takes the amount from the source and then gives it to the
/// receiver; the give is only issued after the take's result is observed,
/// so no partial credit ever occurs without a prior, successful debit.
/// If the receiver rejects the amount, a best-effort compensating give
/// refunds the source; the transfer still fails with the receiver's
/// error, and the refund's own outcome is reported through
/// [`TransferOutcome`].
pub struct Transfer {
    amount: Amount,
    source: Arc<dyn SourceReceiver>,
    receiver: Arc<dyn SourceReceiver>,
}

impl Transfer {
    /// Create a transfer of an amount from a source to a receiver.
    ///
    /// Both ends must also be able to accept the amount back, which keeps
    /// compensation (and reversal) possible.
    pub fn new(
        amount: Amount,
        source: Arc<dyn SourceReceiver>,
        receiver: Arc<dyn SourceReceiver>,
    ) -> Self {
        Self {
            amount,
            source,
            receiver,
        }
    }

    /// Get the amount being transferred.
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    /// Get the participant providing the amount.
    pub fn source(&self) -> &Arc<dyn SourceReceiver> {
        &self.source
    }

    /// Get the participant receiving the amount.
    pub fn receiver(&self) -> &Arc<dyn SourceReceiver> {
        &self.receiver
    }
}

impl Transaction for Transfer {
    type Output = Amount;

    fn execute(&self) -> PendingResult<Amount> {
        let (pending, resolver) = PendingResult::channel();
        run_transfer(
            self.amount.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.receiver),
            resolver,
        );
        pending
    }
}

/// A transfer that can re-debit its original receiver and re-credit its
/// original source.
pub struct ReversibleTransfer {
    amount: Amount,
    original_source: Arc<dyn SourceReceiver>,
    original_receiver: Arc<dyn SourceReceiver>,
}

impl ReversibleTransfer {
    /// Create a reversible transfer of an amount.
    pub fn new(
        amount: Amount,
        original_source: Arc<dyn SourceReceiver>,
        original_receiver: Arc<dyn SourceReceiver>,
    ) -> Self {
        Self {
            amount,
            original_source,
            original_receiver,
        }
    }

    /// Get the amount being transferred.
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    /// Get the participant that provides the amount on execution and
    /// receives it back on reversal.
    pub fn original_source(&self) -> &Arc<dyn SourceReceiver> {
        &self.original_source
    }

    /// Get the participant that receives the amount on execution and
    /// provides it back on reversal.
    pub fn original_receiver(&self) -> &Arc<dyn SourceReceiver> {
        &self.original_receiver
    }
}

impl Transaction for ReversibleTransfer {
    type Output = Amount;

    fn execute(&self) -> PendingResult<Amount> {
        let (pending, resolver) = PendingResult::channel();
        run_transfer(
            self.amount.clone(),
            Arc::clone(&self.original_source),
            Arc::clone(&self.original_receiver),
            resolver,
        );
        pending
    }
}

impl ReversibleTransaction for ReversibleTransfer {
    fn reverse(&self) -> PendingResult<Amount> {
        let (pending, resolver) = PendingResult::channel();
        run_transfer(
            self.amount.clone(),
            Arc::clone(&self.original_receiver),
            Arc::clone(&self.original_source),
            resolver,
        );
        pending
    }
}

/// Drive the take-then-give protocol, resolving `resolver` with the moved
/// amount or with the error that aborted the movement.
pub(crate) fn run_transfer(
    amount: Amount,
    source: Arc<dyn SourceReceiver>,
    receiver: Arc<dyn SourceReceiver>,
    resolver: Resolver<Amount>,
) {
    debug!(
        source = %source.entity_id(),
        receiver = %receiver.entity_id(),
        %amount,
        "transfer started"
    );
    let take = source.async_take(&amount);
    take.once_complete(move |taken| match taken {
        Ok(()) => {
            let give = receiver.async_give(&amount);
            give.once_complete(move |given| match given {
                Ok(()) => {
                    debug!(receiver = %receiver.entity_id(), %amount, "transfer complete");
                    resolver.resolve(Ok(amount));
                }
                Err(give_error) => {
                    let give_error = give_error.clone();
                    // refund the source; the transfer fails with the
                    // receiver's error either way
                    let refund = source.async_give(&amount);
                    refund.once_complete(move |refunded| {
                        let outcome = match refunded {
                            Ok(()) => TransferOutcome::GiveFailedTakeReversed,
                            Err(refund_error) => {
                                warn!(
                                    source = %source.entity_id(),
                                    %amount,
                                    error = %refund_error,
                                    "compensating refund failed"
                                );
                                TransferOutcome::GiveFailedTakeHolds
                            }
                        };
                        resolver.resolve(Err(SystemError::transfer(
                            receiver.entity_id(),
                            outcome,
                            give_error,
                        )));
                    });
                }
            });
        }
        Err(take_error) => {
            resolver.resolve(Err(SystemError::transfer(
                source.entity_id(),
                TransferOutcome::TakeFailed,
                take_error.clone(),
            )));
        }
    });
}
