//! Core state machine types.
//!
//! This module contains the pure part of the controller:
//! - Machine states via the `State` trait and `MachineState`
//! - The problem stack of concurrently active faults
//! - Guard predicates for operation control
//! - Bounded history tracking
//!
//! Nothing in here performs I/O or touches a ledger.

mod guard;
mod history;
mod problems;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use problems::ProblemStack;
pub use state::{MachineState, Problem, State};
