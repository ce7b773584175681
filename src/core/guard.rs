//! Guard predicates over machine states.
//!
//! Guards are pure boolean functions that decide whether an operation may
//! run in the current state. The controller keeps its purchase and cancel
//! rules as guards instead of scattering state comparisons.

use super::state::{MachineState, State};
use std::marker::PhantomData;

/// Pure predicate that determines if an operation can execute.
///
/// # Example
///
/// ```rust
/// use vendomat::core::{Guard, MachineState, State};
///
/// let can_cancel = Guard::new(|state: &MachineState| !state.is_busy());
///
/// assert!(can_cancel.check(&MachineState::Asking));
/// assert!(can_cancel.check(&MachineState::NoCup));
/// assert!(!can_cancel.check(&MachineState::Preparing));
/// ```
pub struct Guard<S: State> {
    predicate: Box<dyn Fn(&S) -> bool + Send + Sync>,
    _phantom: PhantomData<S>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Check if the guard allows the operation from this state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl Guard<MachineState> {
    /// Funds are accepted and drinks can be chosen only when idle.
    pub fn purchase() -> Self {
        Guard::new(|s: &MachineState| matches!(s, MachineState::Idle))
    }

    /// Sugar can be adjusted and the order confirmed only while asking.
    pub fn sugar_selection() -> Self {
        Guard::new(|s: &MachineState| matches!(s, MachineState::Asking))
    }

    /// Everything except a running brew can be cancelled.
    pub fn cancel() -> Self {
        Guard::new(|s: &MachineState| !s.is_busy())
    }
}
