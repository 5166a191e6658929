//! Core state machine types.
//!
//! This module contains the building blocks every machine is made of:
//! - Identifiers, statuses and transition targets
//! - The `Behavior` trait implemented by owner-supplied state logic
//! - `State` nodes with their ordered condition lists
//! - The environment traits a machine needs from the simulation
//!
//! Nothing here mutates a machine. States evaluate their rules and hand a
//! `Verdict` back to the machine that owns them.

mod condition;
mod context;
mod env;
mod state;
mod status;

pub use condition::{Condition, Predicate};
pub use context::{ConditionContext, Goal, StateContext};
pub(crate) use context::{Controls, Request};
pub use env::{FrameClock, Locatable, ObjectLookup};
pub use state::{Behavior, State, Verdict};
pub use status::{Coord3D, ExitReason, Frame, ObjectId, StateId, StateStatus, Target};
