//! Findings reported by topology validation.

use crate::core::StateId;
use thiserror::Error;

/// A single problem in a machine's transition graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyViolation {
    #[error("machine defines no states")]
    NoStates,

    #[error("state {state} leads to undefined state {target}")]
    DanglingTarget { state: StateId, target: StateId },

    #[error("default state {0} is not registered")]
    UnregisteredDefault(StateId),
}
