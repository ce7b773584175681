//! Builder for constructing vending machines.

use crate::config::{CoinConfig, ConfigError, ConfigLoader, DrinkConfig, MachineConfig};
use crate::machine::{MachineObserver, NullObserver, VendingMachine};
use std::time::Duration;

/// Fluent construction of a [`VendingMachine`].
///
/// Starts from [`MachineConfig::default`]. Nothing is checked until
/// [`build`](Self::build), which reports every violation at once.
pub struct MachineBuilder {
    config: MachineConfig,
    observer: Box<dyn MachineObserver>,
}

impl MachineBuilder {
    /// Create a builder with the factory configuration.
    pub fn new() -> Self {
        Self::from_config(MachineConfig::default())
    }

    pub fn from_config(config: MachineConfig) -> Self {
        Self {
            config,
            observer: Box::new(NullObserver),
        }
    }

    /// Start from whatever `loader` supplies.
    pub fn load(loader: &impl ConfigLoader) -> Result<Self, ConfigError> {
        Ok(Self::from_config(loader.load()?))
    }

    /// Replace the drink table.
    pub fn drinks(mut self, drinks: impl IntoIterator<Item = DrinkConfig>) -> Self {
        self.config.drinks = drinks.into_iter().collect();
        self
    }

    /// Replace the coin table.
    pub fn coins(mut self, coins: impl IntoIterator<Item = CoinConfig>) -> Self {
        self.config.coins = coins.into_iter().collect();
        self
    }

    pub fn supplies(mut self, sugar_cubes: i64, cups: i64, spoons: i64) -> Self {
        self.config.sugar_cubes = sugar_cubes;
        self.config.cups = cups;
        self.config.spoons = spoons;
        self
    }

    pub fn stuck_coin_probability(mut self, probability: f64) -> Self {
        self.config.stuck_coin_probability = probability;
        self
    }

    /// Make the stuck-coin simulation reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn brew_duration(mut self, duration: Duration) -> Self {
        self.config.timing.brew_duration_ms = millis(duration);
        self
    }

    pub fn heating_tick(mut self, period: Duration) -> Self {
        self.config.timing.heating_tick_ms = millis(period);
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.timing.history_capacity = capacity;
        self
    }

    pub fn observer(mut self, observer: impl MachineObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Build the machine.
    /// Returns an error listing every configuration violation.
    pub fn build(self) -> Result<VendingMachine, ConfigError> {
        VendingMachine::with_observer(&self.config, self.observer)
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
