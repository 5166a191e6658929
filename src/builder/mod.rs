//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and the `state_ids!` macro for
//! declaring machines with little boilerplate. Machines can also be built
//! incrementally with [`StateMachine::define_state`](crate::runtime::StateMachine::define_state).

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
