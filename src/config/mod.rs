//! Machine configuration.
//!
//! A [`MachineConfig`] carries everything the machine needs at construction:
//! the drink table, the coin table and the initial supplies. Counts are
//! signed so that a negative value in a file is reported as a violation
//! rather than a parse error.
//!
//! # Example
//!
//! ```rust
//! use vendomat::config::MachineConfig;
//!
//! let config = MachineConfig::from_json_str(
//!     r#"{
//!         "drinks": [{ "name": "Espresso", "sugar": true, "price": 40, "stock": 3 }],
//!         "coins": [{ "cents": 50, "stock": 2 }],
//!         "cups": 4
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.drinks[0].name, "Espresso");
//! assert!(config.coins[0].accepted);
//! assert_eq!(config.sugar_cubes, 20);
//! assert!(config.validate().is_ok());
//! ```

mod error;
pub mod validation;

pub use error::{ConfigError, ConfigViolation};

use crate::catalog::{Coin, Drink};
use crate::components::{ChangeMachine, CoinSlot, Stock};
use crate::core::DEFAULT_HISTORY_CAPACITY;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stillwater::validation::Validation;

pub const DEFAULT_BREW_DURATION_MS: u64 = 3_000;
pub const DEFAULT_HEATING_TICK_MS: u64 = 1_000;

const DEFAULT_DRINKS: [(&str, bool); 8] = [
    ("Black Coffee", true),
    ("Cappuccino", true),
    ("Hot Chocolate", true),
    ("Hot Milk", true),
    ("Green Tea", true),
    ("Earl Grey", true),
    ("Tomato Soup", false),
    ("Mushroom Soup", false),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrinkConfig {
    pub name: String,
    #[serde(default)]
    pub sugar: bool,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
}

impl DrinkConfig {
    pub fn new(name: impl Into<String>, sugar: bool, price: i64, stock: i64) -> Self {
        Self {
            name: name.into(),
            sugar,
            price,
            stock,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinConfig {
    pub cents: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "accepted_by_default")]
    pub accepted: bool,
}

fn accepted_by_default() -> bool {
    true
}

impl CoinConfig {
    pub fn new(cents: i64, stock: i64, accepted: bool) -> Self {
        Self {
            cents,
            stock,
            accepted,
        }
    }
}

/// Timer periods and bookkeeping limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub brew_duration_ms: u64,
    pub heating_tick_ms: u64,
    pub history_capacity: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            brew_duration_ms: DEFAULT_BREW_DURATION_MS,
            heating_tick_ms: DEFAULT_HEATING_TICK_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl TimingConfig {
    pub fn brew_duration(&self) -> Duration {
        Duration::from_millis(self.brew_duration_ms)
    }

    pub fn heating_tick(&self) -> Duration {
        Duration::from_millis(self.heating_tick_ms)
    }
}

/// Everything needed to build a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub drinks: Vec<DrinkConfig>,
    pub coins: Vec<CoinConfig>,
    pub sugar_cubes: i64,
    pub cups: i64,
    pub spoons: i64,
    /// Chance that an accepted coin jams in the slot.
    pub stuck_coin_probability: f64,
    /// Seed for the jam simulation; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub timing: TimingConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            drinks: DEFAULT_DRINKS
                .iter()
                .map(|(name, sugar)| DrinkConfig::new(*name, *sugar, 100, 5))
                .collect(),
            coins: Coin::EURO
                .iter()
                .map(|coin| CoinConfig::new(i64::from(coin.cents()), 5, true))
                .collect(),
            sugar_cubes: 20,
            cups: 10,
            spoons: 8,
            stuck_coin_probability: 0.0,
            seed: None,
            timing: TimingConfig::default(),
        }
    }
}

impl MachineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every rule, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match validation::validate(self) {
            Validation::Success(()) => Ok(()),
            Validation::Failure(violations) => Err(ConfigError::Invalid(
                violations.iter().cloned().collect(),
            )),
        }
    }

    /// Drinks in panel order. Call [`validate`](Self::validate) first.
    pub fn drink_table(&self) -> Result<Vec<Drink>, ConfigError> {
        self.drinks
            .iter()
            .map(|d| {
                Ok(Drink::new(
                    d.name.clone(),
                    d.sugar,
                    count(format!("{} price", d.name), d.price)?,
                ))
            })
            .collect()
    }

    pub fn stock(&self) -> Result<Stock, ConfigError> {
        let drinks = self
            .drink_table()?
            .into_iter()
            .zip(&self.drinks)
            .map(|(drink, d)| Ok((drink, count(format!("{} stock", d.name), d.stock)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Stock::new(
            count("sugar_cubes", self.sugar_cubes)?,
            count("cups", self.cups)?,
            count("spoons", self.spoons)?,
            drinks,
        ))
    }

    pub fn change_machine(&self) -> Result<ChangeMachine, ConfigError> {
        let slots = self
            .coins
            .iter()
            .map(|c| {
                let cents = u32::try_from(c.cents)
                    .ok()
                    .filter(|cents| *cents > 0)
                    .ok_or_else(|| {
                        ConfigError::Invalid(vec![ConfigViolation::InvalidDenomination {
                            cents: c.cents,
                        }])
                    })?;
                Ok(CoinSlot {
                    coin: Coin::new(cents),
                    accepted: c.accepted,
                    stock: count(format!("stock of {} cent coins", c.cents), c.stock)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(ChangeMachine::new(slots))
    }
}

fn count(field: impl Into<String>, value: i64) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| {
        ConfigError::Invalid(vec![ConfigViolation::OutOfRange {
            field: field.into(),
            value,
        }])
    })
}

/// Source of a machine configuration.
pub trait ConfigLoader {
    fn load(&self) -> Result<MachineConfig, ConfigError>;
}

impl ConfigLoader for MachineConfig {
    fn load(&self) -> Result<MachineConfig, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads a JSON configuration file.
#[derive(Clone, Debug)]
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigLoader for JsonFileLoader {
    fn load(&self) -> Result<MachineConfig, ConfigError> {
        debug!("Loading configuration from {}", self.path.display());
        let json = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        MachineConfig::from_json_str(&json)
    }
}
