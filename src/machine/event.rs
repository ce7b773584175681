//! Inputs to the controller.
//!
//! User actions, operator actions and timer firings all arrive as [`Event`]
//! values so a single writer can apply them in order.

use crate::catalog::{Coin, Drink};
use crate::components::StockItem;
use crate::core::Problem;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    CoinInserted(Coin),
    DrinkButton(Drink),
    MoreSugar,
    LessSugar,
    Confirm,
    Cancel,
    TakeChange,
    TakeCup,
    WaterSupply(bool),
    HeatingTick,
    /// The brew timer started for `generation` fired.
    BrewTimerExpired { generation: u64 },
    Restock { item: StockItem, level: i64 },
    AddProblem(Problem),
    SolveProblem(Problem),
}

/// Request to fire `BrewTimerExpired { generation }` after `delay`.
///
/// A newer request supersedes older ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrewTimer {
    pub generation: u64,
    pub delay: Duration,
}

/// Errors an event can surface to its sender.
///
/// Customer mistakes are not errors; they only produce observer messages.
/// These are operator mistakes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error(transparent)]
    Stock(#[from] crate::components::StockError),

    #[error("{0} can only be raised by the heating system")]
    ManagedProblem(Problem),
}
