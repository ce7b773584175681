//! Machine states and the fault conditions that can suspend them.
//!
//! `MachineState` is the closed set of modes the controller can display.
//! `Problem` is the subset of those modes that represent a fault and can be
//! held on the problem stack.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for state machine states.
///
/// All methods are pure. States are small values describing what the
/// machine is currently doing.
///
/// # Example
///
/// ```rust
/// use vendomat::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum PumpState {
///     Off,
///     Priming,
///     DryRun,
/// }
///
/// impl State for PumpState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::Priming => "Priming",
///             Self::DryRun => "DryRun",
///         }
///     }
///
///     fn is_fault(&self) -> bool {
///         matches!(self, Self::DryRun)
///     }
/// }
///
/// assert!(PumpState::DryRun.is_fault());
/// assert!(!PumpState::Priming.is_busy());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this state represents a fault that suspends normal operation.
    ///
    /// Default implementation returns `false`.
    fn is_fault(&self) -> bool {
        false
    }

    /// Check if the machine is doing uninterruptible work in this state.
    ///
    /// Default implementation returns `false`.
    fn is_busy(&self) -> bool {
        false
    }
}

crate::state_enum! {
    /// The mode currently shown to the customer.
    ///
    /// Exactly one is active at any instant: the top of the problem stack when
    /// a fault is active, otherwise one of `Idle`, `Asking` or `Preparing`.
    #[derive(Copy, Eq, Hash)]
    pub enum MachineState {
        /// Waiting for coins or a drink choice.
        Idle,
        /// Sugar selection in progress.
        Asking,
        /// A drink is brewing.
        Preparing,
        ColdWater,
        NoWater,
        NoCup,
        NoSpoon,
        StuckCoin,
    }
    fault: [ColdWater, NoWater, NoCup, NoSpoon, StuckCoin]
    busy: [Preparing]
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(State::name(self))
    }
}

/// A fault condition held on the problem stack.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Problem {
    /// Water is below the serving temperature. Driven only by the heating system.
    ColdWater,
    NoWater,
    NoCup,
    NoSpoon,
    StuckCoin,
}

impl Problem {
    pub const ALL: [Problem; 5] = [
        Problem::ColdWater,
        Problem::NoWater,
        Problem::NoCup,
        Problem::NoSpoon,
        Problem::StuckCoin,
    ];

    /// Mechanical faults need an operator. `ColdWater` clears by itself.
    pub fn is_mechanical(self) -> bool {
        !matches!(self, Problem::ColdWater)
    }

    pub(crate) fn bit(self) -> u8 {
        match self {
            Problem::ColdWater => 1,
            Problem::NoWater => 1 << 1,
            Problem::NoCup => 1 << 2,
            Problem::NoSpoon => 1 << 3,
            Problem::StuckCoin => 1 << 4,
        }
    }
}

impl From<Problem> for MachineState {
    fn from(problem: Problem) -> Self {
        match problem {
            Problem::ColdWater => MachineState::ColdWater,
            Problem::NoWater => MachineState::NoWater,
            Problem::NoCup => MachineState::NoCup,
            Problem::NoSpoon => MachineState::NoSpoon,
            Problem::StuckCoin => MachineState::StuckCoin,
        }
    }
}

impl TryFrom<MachineState> for Problem {
    type Error = MachineState;

    fn try_from(state: MachineState) -> Result<Self, Self::Error> {
        match state {
            MachineState::ColdWater => Ok(Problem::ColdWater),
            MachineState::NoWater => Ok(Problem::NoWater),
            MachineState::NoCup => Ok(Problem::NoCup),
            MachineState::NoSpoon => Ok(Problem::NoSpoon),
            MachineState::StuckCoin => Ok(Problem::StuckCoin),
            other => Err(other),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MachineState::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(MachineState::Idle.name(), "Idle");
        assert_eq!(MachineState::Asking.name(), "Asking");
        assert_eq!(MachineState::StuckCoin.name(), "StuckCoin");
        assert_eq!(MachineState::NoWater.to_string(), "NoWater");
    }

    #[test]
    fn fault_states_match_problems() {
        for problem in Problem::ALL {
            let state = MachineState::from(problem);
            assert!(state.is_fault());
            assert_eq!(Problem::try_from(state), Ok(problem));
        }

        for state in [MachineState::Idle, MachineState::Asking, MachineState::Preparing] {
            assert!(!state.is_fault());
            assert_eq!(Problem::try_from(state), Err(state));
        }
    }

    #[test]
    fn only_preparing_is_busy() {
        assert!(MachineState::Preparing.is_busy());
        assert!(!MachineState::Idle.is_busy());
        assert!(!MachineState::NoCup.is_busy());
    }

    #[test]
    fn cold_water_is_not_mechanical() {
        assert!(!Problem::ColdWater.is_mechanical());
        assert!(Problem::StuckCoin.is_mechanical());
        assert!(Problem::NoWater.is_mechanical());
    }

    #[test]
    fn problem_bits_are_distinct() {
        let mut seen = 0u8;
        for problem in Problem::ALL {
            assert_eq!(seen & problem.bit(), 0);
            seen |= problem.bit();
        }
    }

    #[test]
    fn state_serializes_correctly() {
        let state = MachineState::NoCup;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: MachineState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
