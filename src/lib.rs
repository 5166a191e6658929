//! Tickmind: frame-driven hierarchical state machines for simulation objects
//!
//! Every unit in a simulation is animated by a [`StateMachine`] it owns. The
//! machine holds a registry of states keyed by [`StateId`], runs exactly one
//! of them per logic frame and moves between them according to each state's
//! success and failure targets and its ordered list of conditions.
//!
//! # Core Concepts
//!
//! - **Behavior**: owner-supplied logic for one state (`on_enter`, `update`, `on_exit`)
//! - **State**: a behavior plus its transition rules
//! - **Conditions**: predicates checked every frame, even while a state sleeps
//! - **Goal**: an object and a position the states work towards
//! - **Checkpoint**: save/load of the machine's run-time cursor
//!
//! # Example
//!
//! ```rust
//! use tickmind::core::{
//!     Behavior, Condition, ConditionContext, Frame, FrameClock, ObjectId, StateContext, StateId,
//!     StateStatus, Target,
//! };
//! use tickmind::runtime::StateMachine;
//!
//! struct World {
//!     frame: Frame,
//!     enemy_seen: bool,
//! }
//!
//! impl FrameClock for World {
//!     fn current_frame(&self) -> Frame {
//!         self.frame
//!     }
//! }
//!
//! struct Patrol;
//!
//! impl Behavior<World> for Patrol {
//!     fn name(&self) -> &str {
//!         "Patrol"
//!     }
//!
//!     fn update(&mut self, _cx: &mut StateContext<'_, World>) -> StateStatus {
//!         StateStatus::Sleep(15)
//!     }
//! }
//!
//! struct Attack;
//!
//! impl Behavior<World> for Attack {
//!     fn name(&self) -> &str {
//!         "Attack"
//!     }
//!
//!     fn update(&mut self, _cx: &mut StateContext<'_, World>) -> StateStatus {
//!         StateStatus::Success
//!     }
//! }
//!
//! let mut world = World { frame: 1, enemy_seen: false };
//! let mut machine = StateMachine::new(ObjectId(7), "sentry");
//! machine
//!     .define_state(
//!         StateId(1),
//!         Patrol,
//!         Target::Default,
//!         Target::Default,
//!         vec![Condition::new(
//!             |cx: &ConditionContext<'_, World>| cx.env.enemy_seen,
//!             StateId(2),
//!         )],
//!     )
//!     .unwrap();
//! machine
//!     .define_state(StateId(2), Attack, Target::ExitSuccess, Target::Default, vec![])
//!     .unwrap();
//!
//! machine.init_default_state(&mut world);
//! assert_eq!(machine.update(&mut world), StateStatus::Sleep(15));
//!
//! // conditions are still checked while Patrol sleeps
//! world.frame = 2;
//! world.enemy_seen = true;
//! machine.update(&mut world);
//! assert!(machine.is_in_state(StateId(2)));
//!
//! world.frame = 3;
//! assert_eq!(machine.update(&mut world), StateStatus::Success);
//! assert!(machine.current_state_id().is_none());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod runtime;
pub mod validation;

#[cfg(test)]
mod testing;

pub use builder::{BuildError, StateBuilder, StateMachineBuilder};
pub use checkpoint::{MachineSnapshot, XferError};
pub use crate::core::{
    Behavior, Condition, ConditionContext, ExitReason, StateContext, StateId, StateStatus, Target,
};
pub use runtime::{MachineConfig, MachineFault, MachinePhase, StateMachine};
