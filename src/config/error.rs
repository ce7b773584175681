//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// One problem found in a machine configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("At least one drink is required")]
    NoDrinks,

    #[error("Too many drinks ({count}), at most {max} fit on the panel")]
    TooManyDrinks { count: usize, max: usize },

    #[error("Drink #{index} has an empty name")]
    EmptyDrinkName { index: usize },

    #[error("Drink name '{name}' is longer than {max} characters")]
    DrinkNameTooLong { name: String, max: usize },

    #[error("Drink '{name}' is listed twice")]
    DuplicateDrink { name: String },

    #[error("{field} must be between 0 and {max}, got {value}", max = u32::MAX)]
    OutOfRange { field: String, value: i64 },

    #[error("Coin denomination must be positive, got {cents}")]
    InvalidDenomination { cents: i64 },

    #[error("Coin of {cents} cents is listed twice")]
    DuplicateCoin { cents: i64 },

    #[error("Stuck coin probability must be within [0, 1], got {value}")]
    InvalidProbability { value: f64 },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("History capacity must be greater than zero")]
    ZeroHistoryCapacity,
}

/// Errors that prevent a machine from being built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {}", join_violations(.0))]
    Invalid(Vec<ConfigViolation>),

    #[error("Failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// The violations behind an `Invalid` error; empty for other kinds.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            ConfigError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
