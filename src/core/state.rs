//! States and the behavior they run.
//!
//! A [`State`] is one node of a machine: an id, success and failure
//! targets, an ordered list of [`Condition`]s, and the owner-supplied
//! [`Behavior`] doing the actual work. States never change the machine
//! themselves. Evaluating a state's rules yields a [`Verdict`] that the
//! machine carries out.

use super::condition::Condition;
use super::context::{ConditionContext, Goal, StateContext};
use super::status::{ExitReason, ObjectId, StateId, StateStatus, Target};
use crate::checkpoint::XferError;

/// Per-state logic supplied by the machine owner.
///
/// The lifecycle is:
///
/// 1. `on_enter()` - once, when the machine enters the state
/// 2. `update()` - once per logic frame while the state is current and awake
/// 3. `on_exit()` - once, when the machine leaves the state (not on `halt`)
///
/// `on_enter` and `update` report a [`StateStatus`]; the machine uses it to
/// decide whether to sleep, follow a success/failure target or evaluate the
/// state's conditions.
///
/// # Example
///
/// ```rust
/// use tickmind::core::{Behavior, StateContext, StateStatus};
///
/// struct Countdown {
///     remaining: u32,
/// }
///
/// impl<Env> Behavior<Env> for Countdown {
///     fn name(&self) -> &str {
///         "Countdown"
///     }
///
///     fn update(&mut self, _cx: &mut StateContext<'_, Env>) -> StateStatus {
///         if self.remaining == 0 {
///             return StateStatus::Success;
///         }
///         self.remaining -= 1;
///         StateStatus::Sleep(10)
///     }
/// }
/// ```
pub trait Behavior<Env>: Send {
    /// State name for diagnostics.
    fn name(&self) -> &str;

    fn on_enter(&mut self, _cx: &mut StateContext<'_, Env>) -> StateStatus {
        StateStatus::Continue
    }

    fn update(&mut self, cx: &mut StateContext<'_, Env>) -> StateStatus;

    /// Transition requests made here are discarded.
    fn on_exit(&mut self, _cx: &mut StateContext<'_, Env>, _reason: ExitReason) {}

    /// Serialize behavior-specific data for a save game.
    fn save(&self) -> Result<Vec<u8>, XferError> {
        Ok(Vec::new())
    }

    /// Restore data produced by [`Behavior::save`].
    fn load(&mut self, _payload: &[u8]) -> Result<(), XferError> {
        Ok(())
    }
}

/// What the machine should do after a state's rules were evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// No transition; the machine reports this status.
    Stay(StateStatus),
    /// Transition to a registered state (`Goto`) or the default state.
    Enter(Target),
    /// The machine is done and reports this final status.
    Finish(StateStatus),
}

impl Verdict {
    fn follow(target: Target) -> Verdict {
        match target.exit_status() {
            Some(status) => Verdict::Finish(status),
            None => Verdict::Enter(target),
        }
    }
}

/// A registered node of a state machine.
pub struct State<Env> {
    id: StateId,
    success: Target,
    failure: Target,
    conditions: Vec<Condition<Env>>,
    behavior: Box<dyn Behavior<Env>>,
}

impl<Env> State<Env> {
    pub(crate) fn new(id: StateId, behavior: Box<dyn Behavior<Env>>) -> Self {
        Self {
            id,
            success: Target::Default,
            failure: Target::Default,
            conditions: Vec::new(),
            behavior,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    pub fn success_target(&self) -> Target {
        self.success
    }

    pub fn failure_target(&self) -> Target {
        self.failure
    }

    pub fn on_success(&mut self, target: impl Into<Target>) {
        self.success = target.into();
    }

    pub fn on_failure(&mut self, target: impl Into<Target>) {
        self.failure = target.into();
    }

    /// Append a conditional transition. No uniqueness check is made; a
    /// later rule only fires when every earlier one declined.
    pub fn on_condition<F>(
        &mut self,
        predicate: F,
        target: impl Into<Target>,
        description: Option<&str>,
    ) where
        F: Fn(&ConditionContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        let mut condition = Condition::new(predicate, target);
        if let Some(description) = description {
            condition = condition.described(description);
        }
        self.conditions.push(condition);
    }

    pub fn add_condition(&mut self, condition: Condition<Env>) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition<Env>] {
        &self.conditions
    }

    pub fn behavior(&self) -> &dyn Behavior<Env> {
        self.behavior.as_ref()
    }

    pub fn behavior_mut(&mut self) -> &mut dyn Behavior<Env> {
        self.behavior.as_mut()
    }

    /// Every target this state can lead to: success, failure, then the
    /// condition targets in evaluation order.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        [self.success, self.failure]
            .into_iter()
            .chain(self.conditions.iter().map(Condition::target))
    }

    /// Decide what follows a non-sleep status.
    ///
    /// Success and failure follow their targets unconditionally; the
    /// condition list is only consulted for `Continue`.
    pub fn check_for_transitions(
        &self,
        status: StateStatus,
        env: &Env,
        owner: ObjectId,
        goal: Goal,
    ) -> Verdict {
        debug_assert!(!status.is_sleep(), "sleep statuses are handled by the machine");
        match status {
            StateStatus::Success => Verdict::follow(self.success),
            StateStatus::Failure => Verdict::follow(self.failure),
            _ => self
                .first_match(env, owner, goal)
                .unwrap_or(Verdict::Stay(StateStatus::Continue)),
        }
    }

    /// Same rule scan as for `Continue`, run while the machine sleeps.
    /// Without a match the sleep status is handed back unchanged.
    pub fn check_for_sleep_transitions(
        &self,
        status: StateStatus,
        env: &Env,
        owner: ObjectId,
        goal: Goal,
    ) -> Verdict {
        debug_assert!(status.is_sleep(), "only sleep statuses belong here");
        self.first_match(env, owner, goal)
            .unwrap_or(Verdict::Stay(status))
    }

    fn first_match(&self, env: &Env, owner: ObjectId, goal: Goal) -> Option<Verdict> {
        if self.conditions.is_empty() {
            return None;
        }
        let cx = ConditionContext {
            state: self.id,
            behavior: self.behavior.as_ref(),
            env,
            owner,
            goal,
        };
        let condition = self.conditions.iter().find(|c| c.check(&cx))?;
        tracing::trace!(
            state = %self.id,
            name = self.name(),
            condition = condition.description().unwrap_or("[no description]"),
            target = %condition.target(),
            "condition returned true"
        );
        Some(Verdict::follow(condition.target()))
    }
}

impl<Env> std::fmt::Debug for State<Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("success", &self.success)
            .field("failure", &self.failure)
            .field("conditions", &self.conditions)
            .finish()
    }
}
