//! Ordered set of the fault conditions currently active.
//!
//! Faults can co-occur and resolve independently, so this is not a true
//! stack: any entry can be removed. The most recently added remaining entry
//! is the one displayed.

use super::state::{MachineState, Problem};
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of active problems.
///
/// Membership is a bitmask lookup; removal is positional.
///
/// # Example
///
/// ```rust
/// use vendomat::core::{MachineState, Problem, ProblemStack};
///
/// let mut problems = ProblemStack::new();
/// problems.add(Problem::StuckCoin);
/// problems.add(Problem::NoCup);
/// problems.add(Problem::NoWater);
///
/// problems.solve(Problem::NoCup);
/// assert_eq!(problems.current_state(), Some(MachineState::NoWater));
///
/// problems.solve(Problem::NoWater);
/// assert_eq!(problems.current_state(), Some(MachineState::StuckCoin));
///
/// problems.solve(Problem::StuckCoin);
/// assert!(problems.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Problem>", into = "Vec<Problem>")]
pub struct ProblemStack {
    order: Vec<Problem>,
    members: u8,
}

impl ProblemStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a problem unless it is already active. Returns `true` if it was added.
    pub fn add(&mut self, problem: Problem) -> bool {
        if self.contains(problem) {
            return false;
        }
        self.order.push(problem);
        self.members |= problem.bit();
        true
    }

    /// Remove a problem wherever it sits. Returns `true` if it was active.
    pub fn solve(&mut self, problem: Problem) -> bool {
        if !self.contains(problem) {
            return false;
        }
        self.order.retain(|p| *p != problem);
        self.members &= !problem.bit();
        true
    }

    pub fn contains(&self, problem: Problem) -> bool {
        self.members & problem.bit() != 0
    }

    /// The displayed problem: the most recently added one still active.
    pub fn current(&self) -> Option<Problem> {
        self.order.last().copied()
    }

    pub fn current_state(&self) -> Option<MachineState> {
        self.current().map(MachineState::from)
    }

    pub fn has_mechanical(&self) -> bool {
        self.order.iter().any(|p| p.is_mechanical())
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Active problems, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Problem> + '_ {
        self.order.iter().copied()
    }
}

/// Membership is rebuilt from the order, so the two can never disagree.
impl From<Vec<Problem>> for ProblemStack {
    fn from(order: Vec<Problem>) -> Self {
        let mut problems = Self::new();
        for problem in order {
            problems.add(problem);
        }
        problems
    }
}

impl From<ProblemStack> for Vec<Problem> {
    fn from(problems: ProblemStack) -> Self {
        problems.order
    }
}
