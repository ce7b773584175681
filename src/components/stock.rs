//! Consumables ledger: sugar cubes, cups, spoons and drink portions.

use crate::catalog::Drink;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Something the machine keeps a count of.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StockItem {
    SugarCubes,
    Cups,
    Spoons,
    Drink(Drink),
}

impl fmt::Display for StockItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockItem::SugarCubes => f.write_str("sugar cubes"),
            StockItem::Cups => f.write_str("cups"),
            StockItem::Spoons => f.write_str("spoons"),
            StockItem::Drink(drink) => f.write_str(drink.name()),
        }
    }
}

/// Errors raised by the stock ledger. Nothing is mutated when one is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("Can't remove {requested} {item}; only {available} remaining")]
    InsufficientStock {
        item: StockItem,
        requested: u32,
        available: u32,
    },

    #[error("Invalid quantity {value} for {item}")]
    InvalidQuantity { item: StockItem, value: i64 },

    #[error("{name} is not sold by this machine")]
    UnknownDrink { name: String },
}

/// Controller-visible changes in stock. Only cups halt the machine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StockSignal {
    CupsDepleted,
    CupsRestored,
}

/// Stock levels. No level is ever negative; every mutation is validated
/// before it is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stock {
    sugar_cubes: u32,
    cups: u32,
    spoons: u32,
    drinks: BTreeMap<Drink, u32>,
}

impl Stock {
    pub fn new(
        sugar_cubes: u32,
        cups: u32,
        spoons: u32,
        drinks: impl IntoIterator<Item = (Drink, u32)>,
    ) -> Self {
        Self {
            sugar_cubes,
            cups,
            spoons,
            drinks: drinks.into_iter().collect(),
        }
    }

    /// Current level; drinks the machine does not sell have level 0.
    pub fn level(&self, item: &StockItem) -> u32 {
        match item {
            StockItem::SugarCubes => self.sugar_cubes,
            StockItem::Cups => self.cups,
            StockItem::Spoons => self.spoons,
            StockItem::Drink(drink) => self.drinks.get(drink).copied().unwrap_or(0),
        }
    }

    /// Whether at least `quantity` units are available.
    pub fn is_in_stock(&self, item: &StockItem, quantity: u32) -> bool {
        quantity <= self.level(item)
    }

    /// Remove `quantity` units, all or nothing.
    ///
    /// Removing the last cup succeeds and reports `CupsDepleted`.
    pub fn remove(
        &mut self,
        item: &StockItem,
        quantity: u32,
    ) -> Result<Option<StockSignal>, StockError> {
        let available = self.level(item);
        if quantity > available {
            return Err(StockError::InsufficientStock {
                item: item.clone(),
                requested: quantity,
                available,
            });
        }

        let remaining = available - quantity;
        *self.slot_mut(item)? = remaining;

        if matches!(item, StockItem::Cups) && remaining == 0 && quantity > 0 {
            return Ok(Some(StockSignal::CupsDepleted));
        }
        Ok(None)
    }

    /// Replace a level, as the operator does when restocking.
    ///
    /// Setting cups to 0 reports `CupsDepleted`; raising them from 0 reports
    /// `CupsRestored`.
    pub fn set_level(
        &mut self,
        item: &StockItem,
        new_level: i64,
    ) -> Result<Option<StockSignal>, StockError> {
        let new_level = u32::try_from(new_level).map_err(|_| StockError::InvalidQuantity {
            item: item.clone(),
            value: new_level,
        })?;

        let slot = self.slot_mut(item)?;
        let previous = *slot;
        *slot = new_level;

        if new_level > previous {
            info!(
                "{} {item} resupplied (now {new_level} available).",
                new_level - previous
            );
        } else if new_level < previous {
            info!(
                "{} {item} removed from the stock (now {new_level} available).",
                previous - new_level
            );
        }

        if !matches!(item, StockItem::Cups) {
            return Ok(None);
        }
        if new_level == 0 {
            Ok(Some(StockSignal::CupsDepleted))
        } else if previous == 0 {
            Ok(Some(StockSignal::CupsRestored))
        } else {
            Ok(None)
        }
    }

    pub fn sugar_cubes(&self) -> u32 {
        self.sugar_cubes
    }

    pub fn cups(&self) -> u32 {
        self.cups
    }

    pub fn spoons(&self) -> u32 {
        self.spoons
    }

    pub fn drink_level(&self, drink: &Drink) -> u32 {
        self.level(&StockItem::Drink(drink.clone()))
    }

    fn slot_mut(&mut self, item: &StockItem) -> Result<&mut u32, StockError> {
        match item {
            StockItem::SugarCubes => Ok(&mut self.sugar_cubes),
            StockItem::Cups => Ok(&mut self.cups),
            StockItem::Spoons => Ok(&mut self.spoons),
            StockItem::Drink(drink) => self.drinks.get_mut(drink).ok_or_else(|| {
                error!("Stock has no entry for {}", drink.name());
                StockError::UnknownDrink {
                    name: drink.name().to_string(),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tea() -> Drink {
        Drink::new("Green Tea", true, 80)
    }

    fn stock() -> Stock {
        Stock::new(5, 2, 1, [(tea(), 3)])
    }

    #[test]
    fn is_in_stock_compares_levels() {
        let stock = stock();
        assert!(stock.is_in_stock(&StockItem::SugarCubes, 5));
        assert!(!stock.is_in_stock(&StockItem::SugarCubes, 6));
        assert!(stock.is_in_stock(&StockItem::Drink(tea()), 3));
        assert!(!stock.is_in_stock(&StockItem::Drink(Drink::new("Soup", false, 10)), 1));
    }

    #[test]
    fn remove_decrements_level() {
        let mut stock = stock();
        assert_eq!(stock.remove(&StockItem::SugarCubes, 2), Ok(None));
        assert_eq!(stock.sugar_cubes(), 3);

        assert_eq!(stock.remove(&StockItem::Drink(tea()), 1), Ok(None));
        assert_eq!(stock.drink_level(&tea()), 2);
    }

    #[test]
    fn remove_beyond_level_fails_without_mutation() {
        let mut stock = stock();
        let result = stock.remove(&StockItem::SugarCubes, 6);

        assert_eq!(
            result,
            Err(StockError::InsufficientStock {
                item: StockItem::SugarCubes,
                requested: 6,
                available: 5,
            })
        );
        assert_eq!(stock.sugar_cubes(), 5);
    }

    #[test]
    fn removing_last_cup_signals_depletion() {
        let mut stock = stock();
        assert_eq!(stock.remove(&StockItem::Cups, 1), Ok(None));
        assert_eq!(
            stock.remove(&StockItem::Cups, 1),
            Ok(Some(StockSignal::CupsDepleted))
        );
        assert_eq!(stock.cups(), 0);

        assert!(matches!(
            stock.remove(&StockItem::Cups, 1),
            Err(StockError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn set_level_rejects_negative() {
        let mut stock = stock();
        let result = stock.set_level(&StockItem::Spoons, -1);

        assert_eq!(
            result,
            Err(StockError::InvalidQuantity {
                item: StockItem::Spoons,
                value: -1,
            })
        );
        assert_eq!(stock.spoons(), 1);
    }

    #[test]
    fn set_level_signals_cup_transitions() {
        let mut stock = stock();
        assert_eq!(
            stock.set_level(&StockItem::Cups, 0),
            Ok(Some(StockSignal::CupsDepleted))
        );
        assert_eq!(
            stock.set_level(&StockItem::Cups, 10),
            Ok(Some(StockSignal::CupsRestored))
        );
        assert_eq!(stock.set_level(&StockItem::Cups, 12), Ok(None));
        assert_eq!(stock.cups(), 12);
    }

    #[test]
    fn set_level_on_other_items_is_silent() {
        let mut stock = stock();
        assert_eq!(stock.set_level(&StockItem::Spoons, 0), Ok(None));
        assert_eq!(stock.set_level(&StockItem::SugarCubes, 40), Ok(None));
        assert_eq!(stock.sugar_cubes(), 40);
    }

    #[test]
    fn unknown_drink_cannot_be_restocked() {
        let mut stock = stock();
        let soup = Drink::new("Soup", false, 10);
        assert_eq!(
            stock.set_level(&StockItem::Drink(soup), 4),
            Err(StockError::UnknownDrink {
                name: "Soup".to_string()
            })
        );
    }
}
