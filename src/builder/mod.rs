//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder for vending machines and a macro
//! for declaring state enums with minimal boilerplate.
//!
//! # Example
//!
//! ```
//! use vendomat::builder::MachineBuilder;
//! use vendomat::catalog::{Coin, Drink};
//! use vendomat::config::DrinkConfig;
//! use vendomat::core::MachineState;
//!
//! let mut machine = MachineBuilder::new()
//!     .drinks([DrinkConfig::new("Ristretto", false, 30, 4)])
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! machine.insert_coin(Coin::CENT_50);
//! machine.select_drink(&Drink::new("Ristretto", false, 30));
//! assert_eq!(machine.current_state(), MachineState::Preparing);
//! assert_eq!(machine.change_out().total(), 20);
//! ```

pub mod machine;
pub mod macros;

pub use machine::MachineBuilder;
