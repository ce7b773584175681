//! Vendomat: control core of a hot-drinks vending machine
//!
//! The crate models the logic behind the panel: taking coins, paying back
//! change, tracking consumables, keeping the water hot and handling the
//! faults that suspend sales. The graphical front end is not part of it; a
//! front end plugs in through the [`MachineObserver`] trait and feeds user
//! actions in as [`Event`]s.
//!
//! # Core Concepts
//!
//! - **Controller**: [`VendingMachine`], a synchronous state machine that is
//!   the single writer of every counter
//! - **Problem stack**: concurrently active faults, the newest displayed
//! - **Components**: stock ledger, change machine and heating simulation
//! - **Runtime**: an optional tokio task delivering timers and commands
//!
//! # Example
//!
//! ```rust
//! use vendomat::{Coin, Drink, MachineBuilder, MachineState};
//!
//! let mut machine = MachineBuilder::new().seed(1).build().unwrap();
//!
//! machine.insert_coin(Coin::EURO_1);
//! machine.insert_coin(Coin::CENT_50);
//! machine.select_drink(&Drink::new("Cappuccino", true, 100));
//! assert_eq!(machine.current_state(), MachineState::Asking);
//!
//! machine.more_sugar();
//! machine.confirm();
//! assert_eq!(machine.current_state(), MachineState::Preparing);
//! assert_eq!(machine.change_out().total(), 50);
//!
//! // Without the runtime, the owner fires the brew timer itself.
//! let timer = machine.take_timer_requests().pop().unwrap();
//! machine.brew_timer_expired(timer.generation);
//! assert_eq!(machine.current_state(), MachineState::Idle);
//! assert!(machine.is_cup_inside());
//! ```

pub mod builder;
pub mod catalog;
pub mod components;
pub mod config;
pub mod core;
pub mod machine;
pub mod report;
pub mod runtime;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use catalog::{Coin, CoinBag, Drink};
pub use components::StockItem;
pub use config::{ConfigError, ConfigLoader, JsonFileLoader, MachineConfig};
pub use crate::core::{MachineState, Problem, State};
pub use machine::{Event, MachineError, MachineObserver, Notification, VendingMachine};
pub use report::MachineReport;
