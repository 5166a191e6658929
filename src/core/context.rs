//! Views handed to state callbacks and transition predicates.

use super::env::{FrameClock, Locatable, ObjectLookup};
use super::state::Behavior;
use super::status::{Coord3D, Frame, ObjectId, StateId};

/// Auxiliary targeting data a machine carries for its states.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Goal {
    pub object: Option<ObjectId>,
    pub position: Coord3D,
}

impl Goal {
    /// Record the object's id and snapshot its current position.
    pub fn track(&mut self, object: &impl Locatable) {
        self.object = Some(object.object_id());
        self.position = object.position();
    }

    pub fn reset(&mut self) {
        *self = Goal::default();
    }
}

/// A machine operation requested from inside a state callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    SetState(StateId),
    ResetToDefault,
    Clear,
    Halt,
}

/// The part of a machine's run-time data that state callbacks may touch.
#[derive(Debug, Default)]
pub(crate) struct Controls {
    pub(crate) goal: Goal,
    pub(crate) locked: bool,
    pub(crate) locked_by: Option<&'static str>,
    pub(crate) requests: Vec<Request>,
}

/// Handle passed to [`Behavior`] callbacks while a state runs.
///
/// Transition requests (`set_state`, `clear`, `halt`, ...) are queued and
/// applied by the machine, in issue order, as soon as the callback returns.
/// They go through the same lock checks as calls made from outside.
pub struct StateContext<'a, Env> {
    env: &'a mut Env,
    controls: &'a mut Controls,
    owner: ObjectId,
    state: StateId,
}

impl<'a, Env> StateContext<'a, Env> {
    pub(crate) fn new(
        env: &'a mut Env,
        controls: &'a mut Controls,
        owner: ObjectId,
        state: StateId,
    ) -> Self {
        Self {
            env,
            controls,
            owner,
            state,
        }
    }

    pub fn env(&self) -> &Env {
        self.env
    }

    pub fn env_mut(&mut self) -> &mut Env {
        self.env
    }

    /// The object this machine animates.
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Id of the state whose callback is running.
    pub fn state_id(&self) -> StateId {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.controls.locked
    }

    pub fn goal(&self) -> Goal {
        self.controls.goal
    }

    pub fn goal_object_id(&self) -> Option<ObjectId> {
        self.controls.goal.object
    }

    pub fn goal_position(&self) -> Coord3D {
        self.controls.goal.position
    }

    /// Set the goal object. `None` leaves the current goal untouched.
    /// Ignored while the machine is locked.
    pub fn set_goal_object<O: Locatable>(&mut self, object: Option<&O>) {
        if self.controls.locked {
            self.reject("set_goal_object");
            return;
        }
        if let Some(object) = object {
            self.controls.goal.track(object);
        }
    }

    /// Overwrite the goal position. Ignored while the machine is locked.
    pub fn set_goal_position(&mut self, position: Coord3D) {
        if self.controls.locked {
            self.reject("set_goal_position");
            return;
        }
        self.controls.goal.position = position;
    }

    /// Request a transition to `id` once the callback returns.
    pub fn set_state(&mut self, id: impl Into<StateId>) {
        self.controls.requests.push(Request::SetState(id.into()));
    }

    pub fn reset_to_default_state(&mut self) {
        self.controls.requests.push(Request::ResetToDefault);
    }

    pub fn clear(&mut self) {
        self.controls.requests.push(Request::Clear);
    }

    /// Request an abrupt stop: the machine locks and drops its current
    /// state without running exit hooks.
    pub fn halt(&mut self) {
        self.controls.requests.push(Request::Halt);
    }

    /// Lock the machine right away. Requests already queued by this
    /// callback are then rejected like any external call.
    pub fn lock(&mut self, locked_by: &'static str) {
        self.controls.locked = true;
        self.controls.locked_by = Some(locked_by);
    }

    pub fn unlock(&mut self) {
        self.controls.locked = false;
        self.controls.locked_by = None;
    }

    fn reject(&self, operation: &'static str) {
        tracing::warn!(
            owner = %self.owner,
            state = %self.state,
            locked_by = self.controls.locked_by.unwrap_or("unknown"),
            operation,
            "machine is locked; call ignored"
        );
    }
}

impl<'a, Env: FrameClock> StateContext<'a, Env> {
    pub fn frame(&self) -> Frame {
        self.env.current_frame()
    }
}

impl<'a, Env: ObjectLookup> StateContext<'a, Env> {
    /// Resolve the goal object through the environment.
    pub fn goal_object(&self) -> Option<&Env::Object> {
        self.controls
            .goal
            .object
            .and_then(|id| self.env.find_object(id))
    }

    /// Look the object up and make it the goal. Unknown ids are ignored,
    /// as is any call while the machine is locked.
    pub fn set_goal_object_id(&mut self, id: ObjectId) {
        if self.controls.locked {
            self.reject("set_goal_object_id");
            return;
        }
        if let Some(object) = self.env.find_object(id) {
            self.controls.goal.track(object);
        }
    }
}

/// Read-only view handed to transition predicates.
pub struct ConditionContext<'a, Env> {
    pub state: StateId,
    pub behavior: &'a dyn Behavior<Env>,
    pub env: &'a Env,
    pub owner: ObjectId,
    pub goal: Goal,
}

impl<'a, Env: FrameClock> ConditionContext<'a, Env> {
    pub fn frame(&self) -> Frame {
        self.env.current_frame()
    }
}

impl<'a, Env: ObjectLookup> ConditionContext<'a, Env> {
    pub fn goal_object(&self) -> Option<&'a Env::Object> {
        let env: &'a Env = self.env;
        self.goal.object.and_then(|id| env.find_object(id))
    }
}
