//! Configuration checks.
//!
//! Every check runs and every violation is reported, so an operator can fix
//! a configuration in one pass instead of one error at a time.

use super::error::ConfigViolation;
use super::MachineConfig;
use crate::catalog::MAX_DRINK_NAME_LEN;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Most drinks the panel has buttons for.
pub const MAX_DRINKS: usize = 10;

/// Result of a single check.
pub type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn require(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn count_in_range(field: impl Into<String>, value: i64) -> Check {
    require(u32::try_from(value).is_ok(), || ConfigViolation::OutOfRange {
        field: field.into(),
        value,
    })
}

/// Run every check, accumulating ALL violations.
pub fn validate(config: &MachineConfig) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    checks.push(require(!config.drinks.is_empty(), || ConfigViolation::NoDrinks));
    checks.push(require(config.drinks.len() <= MAX_DRINKS, || {
        ConfigViolation::TooManyDrinks {
            count: config.drinks.len(),
            max: MAX_DRINKS,
        }
    }));

    let mut names = HashSet::new();
    for (index, drink) in config.drinks.iter().enumerate() {
        checks.push(require(!drink.name.trim().is_empty(), || {
            ConfigViolation::EmptyDrinkName { index }
        }));
        checks.push(require(
            drink.name.chars().count() <= MAX_DRINK_NAME_LEN,
            || ConfigViolation::DrinkNameTooLong {
                name: drink.name.clone(),
                max: MAX_DRINK_NAME_LEN,
            },
        ));
        checks.push(require(names.insert(drink.name.as_str()), || {
            ConfigViolation::DuplicateDrink {
                name: drink.name.clone(),
            }
        }));
        checks.push(count_in_range(format!("{} price", drink.name), drink.price));
        checks.push(count_in_range(format!("{} stock", drink.name), drink.stock));
    }

    let mut denominations = HashSet::new();
    for coin in &config.coins {
        checks.push(require(
            coin.cents > 0 && u32::try_from(coin.cents).is_ok(),
            || ConfigViolation::InvalidDenomination { cents: coin.cents },
        ));
        checks.push(require(denominations.insert(coin.cents), || {
            ConfigViolation::DuplicateCoin { cents: coin.cents }
        }));
        checks.push(count_in_range(
            format!("stock of {} cent coins", coin.cents),
            coin.stock,
        ));
    }

    checks.push(count_in_range("sugar_cubes", config.sugar_cubes));
    checks.push(count_in_range("cups", config.cups));
    checks.push(count_in_range("spoons", config.spoons));

    let probability = config.stuck_coin_probability;
    checks.push(require((0.0..=1.0).contains(&probability), || {
        ConfigViolation::InvalidProbability { value: probability }
    }));

    checks.push(require(config.timing.brew_duration_ms > 0, || {
        ConfigViolation::ZeroDuration {
            field: "brew_duration_ms",
        }
    }));
    checks.push(require(config.timing.heating_tick_ms > 0, || {
        ConfigViolation::ZeroDuration {
            field: "heating_tick_ms",
        }
    }));
    checks.push(require(config.timing.history_capacity > 0, || {
        ConfigViolation::ZeroHistoryCapacity
    }));

    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoinConfig, DrinkConfig};

    fn violations(config: &MachineConfig) -> Vec<ConfigViolation> {
        match validate(config) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    #[test]
    fn default_configuration_is_valid() {
        assert!(validate(&MachineConfig::default()).is_success());
    }

    #[test]
    fn accumulates_all_violations() {
        let mut config = MachineConfig::default();
        config.cups = -1;
        config.spoons = -2;
        config.stuck_coin_probability = 1.5;
        config.drinks[0].name = String::new();

        let found = violations(&config);
        assert_eq!(found.len(), 4);
        assert!(found.contains(&ConfigViolation::OutOfRange {
            field: "cups".to_string(),
            value: -1,
        }));
        assert!(found.contains(&ConfigViolation::OutOfRange {
            field: "spoons".to_string(),
            value: -2,
        }));
        assert!(found.contains(&ConfigViolation::EmptyDrinkName { index: 0 }));
        assert!(found.contains(&ConfigViolation::InvalidProbability { value: 1.5 }));
    }

    #[test]
    fn drink_rules_are_enforced() {
        let mut config = MachineConfig::default();
        config.drinks = vec![
            DrinkConfig::new("Extraordinarily Long Name", true, 100, 5),
            DrinkConfig::new("Tea", false, -10, 5),
            DrinkConfig::new("Tea", false, 10, -5),
        ];

        let found = violations(&config);
        assert!(found.contains(&ConfigViolation::DrinkNameTooLong {
            name: "Extraordinarily Long Name".to_string(),
            max: MAX_DRINK_NAME_LEN,
        }));
        assert!(found.contains(&ConfigViolation::DuplicateDrink {
            name: "Tea".to_string()
        }));
        assert!(found.contains(&ConfigViolation::OutOfRange {
            field: "Tea price".to_string(),
            value: -10,
        }));
        assert!(found.contains(&ConfigViolation::OutOfRange {
            field: "Tea stock".to_string(),
            value: -5,
        }));
    }

    #[test]
    fn drink_count_is_bounded() {
        let mut config = MachineConfig::default();
        config.drinks.clear();
        assert_eq!(violations(&config), vec![ConfigViolation::NoDrinks]);

        config.drinks = (0..11)
            .map(|i| DrinkConfig::new(format!("Drink {i}"), false, 50, 1))
            .collect();
        assert_eq!(
            violations(&config),
            vec![ConfigViolation::TooManyDrinks { count: 11, max: 10 }]
        );
    }

    #[test]
    fn coin_rules_are_enforced() {
        let mut config = MachineConfig::default();
        config.coins = vec![
            CoinConfig::new(0, 1, true),
            CoinConfig::new(50, 1, true),
            CoinConfig::new(50, -1, false),
        ];

        let found = violations(&config);
        assert!(found.contains(&ConfigViolation::InvalidDenomination { cents: 0 }));
        assert!(found.contains(&ConfigViolation::DuplicateCoin { cents: 50 }));
        assert!(found.contains(&ConfigViolation::OutOfRange {
            field: "stock of 50 cent coins".to_string(),
            value: -1,
        }));
    }

    #[test]
    fn timing_must_be_positive() {
        let mut config = MachineConfig::default();
        config.timing.brew_duration_ms = 0;
        config.timing.history_capacity = 0;

        let found = violations(&config);
        assert_eq!(found.len(), 2);
        assert!(found.contains(&ConfigViolation::ZeroDuration {
            field: "brew_duration_ms"
        }));
        assert!(found.contains(&ConfigViolation::ZeroHistoryCapacity));
    }
}
