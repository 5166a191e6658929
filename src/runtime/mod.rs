//! The machine that drives states frame by frame.
//!
//! [`StateMachine`] owns its states, tracks the current one, its sleep
//! deadline, the goal data and the lock. Misuse and misconfiguration are
//! reported as [`MachineFault`]s and recovered from; they never abort the
//! simulation.

mod config;
mod fault;
mod machine;

pub use config::{MachineConfig, DEFAULT_MAX_TRANSITION_DEPTH};
pub use fault::MachineFault;
pub use machine::{MachinePhase, StateMachine};
