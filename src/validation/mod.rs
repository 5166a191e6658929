//! Validation of a machine's transition graph.
//!
//! A machine built from hand-written `define_state` calls can easily point
//! a transition at an id that was never registered. At run time such a
//! transition is reported and recovered by falling back to the default
//! state; this module finds those mistakes up front.
//!
//! Following Stillwater's philosophy, validation does not stop at the first
//! problem: every violation in the graph is collected in one pass.
//!
//! # Example
//!
//! ```rust
//! use tickmind::core::{Behavior, ObjectId, StateContext, StateId, StateStatus, Target};
//! use tickmind::runtime::StateMachine;
//!
//! struct Wait;
//!
//! impl Behavior<()> for Wait {
//!     fn name(&self) -> &str {
//!         "Wait"
//!     }
//!
//!     fn update(&mut self, _cx: &mut StateContext<'_, ()>) -> StateStatus {
//!         StateStatus::Continue
//!     }
//! }
//!
//! let mut machine: StateMachine<()> = StateMachine::new(ObjectId(1), "guard");
//! machine
//!     .define_state(StateId(1), Wait, StateId(2), Target::ExitFailure, vec![])
//!     .unwrap();
//!
//! // state 2 was never defined
//! assert!(machine.validate().is_failure());
//! ```

mod topology;
pub mod violations;

pub use violations::TopologyViolation;
