//! Trades: two opposite transfers of two different assets.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use coffer_common::{
    Amount, EntityId, PendingResult, Resolvable, Resolver, SystemError, TradeLeg,
    TransferOutcome,
};
use coffer_ledger::SourceReceiver;

use crate::transfer::{run_transfer, ReversibleTransaction, Transaction};

/// A pair of amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountPair {
    first: Amount,
    second: Amount,
}

impl AmountPair {
    /// Create a pair of amounts.
    pub fn new(first: Amount, second: Amount) -> Self {
        Self { first, second }
    }

    /// Get the first amount.
    pub fn first(&self) -> &Amount {
        &self.first
    }

    /// Get the second amount.
    pub fn second(&self) -> &Amount {
        &self.second
    }

    /// Get the pair with its order, and thus direction, swapped.
    pub fn swap(&self) -> AmountPair {
        AmountPair {
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }
}

/// A trade of two assets between two participants.
///
/// A trade is two transfers of different asset type: the first amount
/// moves from the first participant to the second, then the second
/// amount moves from the second participant to the first. Each transfer
/// compensates internally, but the trade does **not** enforce atomicity
/// across its two transfers: a committed first leg stands when the
/// second fails, and the error reports which leg aborted.
///
/// Trades are naturally reversible by swapping the amount pair.
pub struct Trade {
    amounts: AmountPair,
    first: Arc<dyn SourceReceiver>,
    second: Arc<dyn SourceReceiver>,
}

impl Trade {
    /// Create a trade of the given amounts between two participants.
    pub fn new(
        amounts: AmountPair,
        first: Arc<dyn SourceReceiver>,
        second: Arc<dyn SourceReceiver>,
    ) -> Self {
        Self {
            amounts,
            first,
            second,
        }
    }

    /// Get the amounts involved in this trade.
    pub fn amounts(&self) -> &AmountPair {
        &self.amounts
    }

    /// Get the first participant.
    pub fn first_participant(&self) -> &Arc<dyn SourceReceiver> {
        &self.first
    }

    /// Get the second participant.
    pub fn second_participant(&self) -> &Arc<dyn SourceReceiver> {
        &self.second
    }
}

impl Transaction for Trade {
    type Output = AmountPair;

    fn execute(&self) -> PendingResult<AmountPair> {
        let (pending, resolver) = PendingResult::channel();
        run_trade(
            self.amounts.clone(),
            Arc::clone(&self.first),
            Arc::clone(&self.second),
            resolver,
        );
        pending
    }
}

impl ReversibleTransaction for Trade {
    fn reverse(&self) -> PendingResult<AmountPair> {
        let (pending, resolver) = PendingResult::channel();
        run_trade(
            self.amounts.swap(),
            Arc::clone(&self.first),
            Arc::clone(&self.second),
            resolver,
        );
        pending
    }
}

fn run_trade(
    amounts: AmountPair,
    first: Arc<dyn SourceReceiver>,
    second: Arc<dyn SourceReceiver>,
    resolver: Resolver<AmountPair>,
) {
    debug!(
        first = %first.entity_id(),
        second = %second.entity_id(),
        first_amount = %amounts.first(),
        second_amount = %amounts.second(),
        "trade started"
    );
    let first_leg = {
        let (pending, leg_resolver) = PendingResult::channel();
        run_transfer(
            amounts.first().clone(),
            Arc::clone(&first),
            Arc::clone(&second),
            leg_resolver,
        );
        pending
    };
    first_leg.once_complete(move |leg| match leg {
        Ok(_) => {
            let second_leg = {
                let (pending, leg_resolver) = PendingResult::channel();
                run_transfer(
                    amounts.second().clone(),
                    Arc::clone(&second),
                    Arc::clone(&first),
                    leg_resolver,
                );
                pending
            };
            second_leg.once_complete(move |leg| match leg {
                Ok(_) => resolver.resolve(Ok(amounts)),
                Err(error) => resolver.resolve(Err(leg_error(
                    TradeLeg::Second,
                    second.entity_id(),
                    error,
                ))),
            });
        }
        Err(error) => {
            resolver.resolve(Err(leg_error(TradeLeg::First, first.entity_id(), error)));
        }
    });
}

fn leg_error(leg: TradeLeg, participant: EntityId, error: &SystemError) -> SystemError {
    let outcome = match error {
        SystemError::Transfer { outcome, .. } => *outcome,
        _ => TransferOutcome::TakeFailed,
    };
    SystemError::trade(participant, leg, outcome, error.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_common::Asset;
    use coffer_ledger::{MemoryStore, Receiver, Total};
    use rust_decimal::Decimal;

    fn gold() -> Asset {
        Asset::currency("gold").unwrap()
    }

    fn gems() -> Asset {
        Asset::item("gems").unwrap()
    }

    fn amount(asset: Asset, quantity: i64) -> Amount {
        Amount::new(asset, Decimal::from(quantity)).unwrap()
    }

    fn store(key: &str) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(EntityId::new("player", key).unwrap()))
    }

    fn trade_thirty_gold_for_ten_gems(
        alice: &Arc<MemoryStore>,
        bob: &Arc<MemoryStore>,
    ) -> Trade {
        Trade::new(
            AmountPair::new(amount(gold(), 30), amount(gems(), 10)),
            alice.clone(),
            bob.clone(),
        )
    }

    #[test]
    fn test_trade_swaps_assets() {
        let alice = store("alice");
        let bob = store("bob");
        alice.give(&amount(gold(), 30)).unwrap();
        bob.give(&amount(gems(), 10)).unwrap();

        let trade = trade_thirty_gold_for_ten_gems(&alice, &bob);
        let amounts = trade.execute().wait().unwrap();
        assert_eq!(amounts.first(), &amount(gold(), 30));

        assert_eq!(alice.total(&gold()).unwrap(), Some(amount(gold(), 0)));
        assert_eq!(alice.total(&gems()).unwrap(), Some(amount(gems(), 10)));
        assert_eq!(bob.total(&gold()).unwrap(), Some(amount(gold(), 30)));
        assert_eq!(bob.total(&gems()).unwrap(), Some(amount(gems(), 0)));
    }

    #[test]
    fn test_first_leg_failure_reports_first() {
        let alice = store("alice");
        let bob = store("bob");
        bob.give(&amount(gems(), 10)).unwrap();

        let trade = trade_thirty_gold_for_ten_gems(&alice, &bob);
        let error = trade.execute().wait().unwrap_err();

        match error {
            SystemError::Trade {
                participant,
                leg,
                outcome,
                ..
            } => {
                assert_eq!(participant, alice.entity_id());
                assert_eq!(leg, TradeLeg::First);
                assert_eq!(outcome, TransferOutcome::TakeFailed);
            }
            other => panic!("expected trade error, got {other}"),
        }
        // nothing moved in either direction
        assert_eq!(bob.total(&gems()).unwrap(), Some(amount(gems(), 10)));
        assert_eq!(bob.total(&gold()).unwrap(), None);
    }

    #[test]
    fn test_second_leg_failure_leaves_first_leg_committed() {
        let alice = store("alice");
        let bob = store("bob");
        alice.give(&amount(gold(), 30)).unwrap();
        // bob holds no gems, so the second leg's take fails

        let trade = trade_thirty_gold_for_ten_gems(&alice, &bob);
        let error = trade.execute().wait().unwrap_err();

        match error {
            SystemError::Trade { leg, outcome, .. } => {
                assert_eq!(leg, TradeLeg::Second);
                assert_eq!(outcome, TransferOutcome::TakeFailed);
            }
            other => panic!("expected trade error, got {other}"),
        }
        // the committed first leg stands: gold already moved to bob
        assert_eq!(alice.total(&gold()).unwrap(), Some(amount(gold(), 0)));
        assert_eq!(bob.total(&gold()).unwrap(), Some(amount(gold(), 30)));
    }

    #[test]
    fn test_reverse_returns_both_amounts() {
        let alice = store("alice");
        let bob = store("bob");
        alice.give(&amount(gold(), 30)).unwrap();
        bob.give(&amount(gems(), 10)).unwrap();

        let trade = trade_thirty_gold_for_ten_gems(&alice, &bob);
        trade.execute().wait().unwrap();
        trade.reverse().wait().unwrap();

        assert_eq!(alice.total(&gold()).unwrap(), Some(amount(gold(), 30)));
        assert_eq!(alice.total(&gems()).unwrap(), Some(amount(gems(), 0)));
        assert_eq!(bob.total(&gems()).unwrap(), Some(amount(gems(), 10)));
        assert_eq!(bob.total(&gold()).unwrap(), Some(amount(gold(), 0)));
    }

    #[test]
    fn test_amount_pair_swap() {
        let pair = AmountPair::new(amount(gold(), 30), amount(gems(), 10));
        let swapped = pair.swap();
        assert_eq!(swapped.first(), pair.second());
        assert_eq!(swapped.second(), pair.first());
        assert_eq!(swapped.swap(), pair);
    }
}
