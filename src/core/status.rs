//! Identifiers, results and targets shared by states and machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logic frame number, as reported by a [`FrameClock`](super::FrameClock).
pub type Frame = u32;

/// Machine-local identifier of a registered state.
///
/// Ids only need to be unique within one machine. The first id registered
/// becomes the machine's default state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl From<u32> for StateId {
    fn from(raw: u32) -> Self {
        StateId(raw)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a simulation object (the machine owner or a goal object).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj:{}", self.0)
    }
}

/// World-space position used for goal tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Coord3D {
    pub const ZERO: Coord3D = Coord3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Result reported by a state's `on_enter`/`update` and by every machine step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateStatus {
    /// Keep running the current state; conditional transitions are evaluated.
    Continue,
    /// The state finished successfully; follow its success target.
    Success,
    /// The state failed; follow its failure target.
    Failure,
    /// Skip full updates for the given number of frames. Conditional
    /// transitions are still evaluated every frame while asleep.
    Sleep(Frame),
}

impl StateStatus {
    pub fn is_sleep(&self) -> bool {
        matches!(self, StateStatus::Sleep(_))
    }

    /// Success and failure end the current state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StateStatus::Success | StateStatus::Failure)
    }
}

/// Why a state is being exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// Ordinary transition to another state (or to machine completion).
    Normal,
    /// The machine is being cleared or reset to its default state.
    Reset,
}

/// Where a state's success, failure or condition rule leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Enter the given registered state.
    Goto(StateId),
    /// Enter the machine's default state.
    Default,
    /// Stop the machine and report success.
    ExitSuccess,
    /// Stop the machine and report failure.
    ExitFailure,
}

impl Target {
    /// The registered state this target needs, if any.
    pub fn state_id(&self) -> Option<StateId> {
        match self {
            Target::Goto(id) => Some(*id),
            _ => None,
        }
    }

    /// The final result when this target ends the machine.
    pub fn exit_status(&self) -> Option<StateStatus> {
        match self {
            Target::ExitSuccess => Some(StateStatus::Success),
            Target::ExitFailure => Some(StateStatus::Failure),
            _ => None,
        }
    }
}

impl From<StateId> for Target {
    fn from(id: StateId) -> Self {
        Target::Goto(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Goto(id) => write!(f, "{id}"),
            Target::Default => write!(f, "default"),
            Target::ExitSuccess => write!(f, "exit-success"),
            Target::ExitFailure => write!(f, "exit-failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_is_not_terminal() {
        assert!(StateStatus::Sleep(3).is_sleep());
        assert!(!StateStatus::Sleep(3).is_terminal());
        assert!(StateStatus::Success.is_terminal());
        assert!(StateStatus::Failure.is_terminal());
        assert!(!StateStatus::Continue.is_terminal());
    }

    #[test]
    fn exit_targets_carry_final_status() {
        assert_eq!(Target::ExitSuccess.exit_status(), Some(StateStatus::Success));
        assert_eq!(Target::ExitFailure.exit_status(), Some(StateStatus::Failure));
        assert_eq!(Target::Default.exit_status(), None);
        assert_eq!(Target::Goto(StateId(4)).exit_status(), None);
    }

    #[test]
    fn raw_ids_convert_into_goto_targets() {
        let target: Target = StateId(7).into();
        assert_eq!(target, Target::Goto(StateId(7)));
        assert_eq!(target.state_id(), Some(StateId(7)));
        assert_eq!(Target::ExitSuccess.state_id(), None);
    }

    #[test]
    fn status_serializes_correctly() {
        let json = serde_json::to_string(&StateStatus::Sleep(12)).unwrap();
        let back: StateStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateStatus::Sleep(12));
    }
}
