//! Faults a machine reports and recovers from.

use crate::core::StateId;
use thiserror::Error;

/// Misconfiguration or misuse detected while a machine runs.
///
/// Faults are never returned as errors. The machine logs them, keeps them
/// in its fault journal and carries on in a degraded but valid state,
/// usually by falling back to its default state or reporting
/// `StateStatus::Failure` for the offending call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineFault {
    #[error("default state initialized twice")]
    DefaultStateAlreadyInited,

    #[error("reset to default state before the default state was initialized")]
    DefaultStateNotInited,

    #[error("machine has no default state")]
    MissingDefaultState,

    #[error("transition to unknown state {requested}, recovering in default state {fallback}")]
    UnknownState { requested: StateId, fallback: StateId },

    #[error("machine updated without a current state; was the default state initialized?")]
    NoCurrentState,

    #[error("transition depth exceeded {limit}; aborting the transition chain")]
    TransitionDepthExceeded { limit: usize },
}
