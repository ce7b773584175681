//! Coin inventory and change dispensing.
//!
//! Change is computed greedily over the accepted denominations, largest
//! first. For canonical coin sets such as the euro this finds exact change
//! whenever the stock allows it; for other sets it may miss a combination
//! that exists, and that behavior is kept as is.

use crate::catalog::{Coin, CoinBag};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChangeError {
    #[error("Coin {0} is not recognized by the machine")]
    UnrecognizedCoin(Coin),

    #[error("No combination of coins in stock makes {amount} cents")]
    ChangeImpossible { amount: u32 },
}

/// Result of a change request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The coins handed out; already removed from stock.
    Dispensed(CoinBag),
    /// Nothing was removed.
    Impossible,
}

/// Catalog entry for one denomination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSlot {
    pub coin: Coin,
    pub accepted: bool,
    pub stock: u32,
}

/// Per-denomination coin stock plus the acceptance table fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeMachine {
    stock: BTreeMap<Coin, u32>,
    accepted: BTreeMap<Coin, bool>,
}

impl ChangeMachine {
    pub fn new(slots: impl IntoIterator<Item = CoinSlot>) -> Self {
        let mut stock = BTreeMap::new();
        let mut accepted = BTreeMap::new();
        for slot in slots {
            stock.insert(slot.coin, slot.stock);
            accepted.insert(slot.coin, slot.accepted);
        }
        Self { stock, accepted }
    }

    /// Whether the coin belongs to the catalog at all.
    pub fn knows(&self, coin: Coin) -> bool {
        self.accepted.contains_key(&coin)
    }

    /// Whether the coin is credited toward a purchase.
    pub fn is_accepted(&self, coin: Coin) -> bool {
        self.accepted.get(&coin).copied().unwrap_or(false)
    }

    /// Put a coin into stock. Accepted or not, a catalog coin is counted.
    pub fn insert_coin(&mut self, coin: Coin) -> Result<(), ChangeError> {
        let count = self
            .stock
            .get_mut(&coin)
            .ok_or(ChangeError::UnrecognizedCoin(coin))?;
        *count += 1;
        Ok(())
    }

    pub fn coin_stock(&self, coin: Coin) -> u32 {
        self.stock.get(&coin).copied().unwrap_or(0)
    }

    /// Value of every coin held, in cents.
    pub fn stock_value(&self) -> u64 {
        self.stock
            .iter()
            .map(|(coin, count)| u64::from(coin.cents()) * u64::from(*count))
            .sum()
    }

    /// Catalog entries, largest denomination first.
    pub fn slots(&self) -> Vec<CoinSlot> {
        self.stock
            .iter()
            .rev()
            .map(|(coin, stock)| CoinSlot {
                coin: *coin,
                accepted: self.is_accepted(*coin),
                stock: *stock,
            })
            .collect()
    }

    /// Work out the greedy dispensing plan for `amount` without touching stock.
    pub fn plan_change(&self, amount: u32) -> Option<CoinBag> {
        let mut remaining = amount;
        let mut plan = CoinBag::new();

        for (coin, available) in self.stock.iter().rev() {
            if remaining == 0 {
                break;
            }
            if !self.is_accepted(*coin) || *available == 0 {
                continue;
            }
            let take = (remaining / coin.cents()).min(*available);
            if take > 0 {
                plan.add(*coin, take);
                remaining -= take * coin.cents();
            }
        }

        if remaining == 0 {
            Some(plan)
        } else {
            debug!("No change plan for {amount} cents ({remaining} left over)");
            None
        }
    }

    /// Dispense `amount` in change, committing the plan only if it is exact.
    pub fn try_give_change(&mut self, amount: u32) -> ChangeOutcome {
        let Some(plan) = self.plan_change(amount) else {
            warn!("Unable to give {amount} cents of change");
            return ChangeOutcome::Impossible;
        };

        for (coin, count) in plan.iter() {
            if let Some(stock) = self.stock.get_mut(&coin) {
                *stock -= count;
            }
        }
        ChangeOutcome::Dispensed(plan)
    }
}
