//! The machine's physical subsystems.
//!
//! Each component owns its counters and reports controller-visible changes
//! as signals instead of calling back into the controller.

pub mod change;
pub mod heating;
pub mod stock;

pub use change::{ChangeError, ChangeMachine, ChangeOutcome, CoinSlot};
pub use heating::{HeatingSignal, HeatingState, HeatingSystem};
pub use stock::{Stock, StockError, StockItem, StockSignal};
