//! Build errors for state machines and states.

use crate::core::StateId;
use crate::validation::TopologyViolation;
use thiserror::Error;

/// Errors that can occur when assembling a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State {0} is already defined in this machine")]
    DuplicateState(StateId),

    #[error("No states defined. Add at least one state; the first becomes the default")]
    NoStates,

    #[error("Transition graph is invalid: {}", describe(.0))]
    InvalidTopology(Vec<TopologyViolation>),
}

fn describe(violations: &[TopologyViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
