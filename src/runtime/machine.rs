//! The frame-driven state machine.

use crate::builder::BuildError;
use crate::core::{
    Behavior, Condition, Controls, Coord3D, ExitReason, Frame, FrameClock, Goal, Locatable,
    ObjectId, ObjectLookup, Request, State, StateContext, StateId, StateStatus, Target, Verdict,
};
use crate::runtime::config::MachineConfig;
use crate::runtime::fault::MachineFault;
use std::collections::BTreeMap;
use std::fmt;
use stillwater::validation::Validation;

/// Coarse life-cycle position of a machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachinePhase {
    /// States may be defined; the default state has not been entered yet.
    Uninitialized,
    /// A state is current and gets updated every frame.
    Running,
    /// A state is current but its updates are skipped until a later frame.
    Sleeping,
    /// An exit target was reached.
    Done,
    /// The current state was cleared; nothing runs until a state is set.
    Cleared,
    /// The owner stopped the machine for good.
    Halted,
}

/// Where `internal_set_state` should go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Next {
    State(StateId),
    Default,
    Done,
}

/// Run-to-completion state machine animating one simulation object.
///
/// The owner calls [`update`](Self::update) once per logic frame. A call
/// either scans the conditions of a sleeping state or runs the current
/// state's `update`, then performs at most one transition chain, invoking
/// `on_exit` on the old state before `on_enter` on the new one.
pub struct StateMachine<Env> {
    pub(crate) name: String,
    pub(crate) owner: ObjectId,
    pub(crate) config: MachineConfig,
    pub(crate) states: BTreeMap<StateId, State<Env>>,
    pub(crate) default_state: Option<StateId>,
    pub(crate) current: Option<StateId>,
    pub(crate) sleep_until: Frame,
    pub(crate) default_state_inited: bool,
    pub(crate) finished: bool,
    pub(crate) controls: Controls,
    depth: usize,
    overflows: usize,
    faults: Vec<MachineFault>,
}

impl<Env> StateMachine<Env> {
    pub fn new(owner: ObjectId, name: impl Into<String>) -> Self {
        Self::with_config(owner, name, MachineConfig::default())
    }

    pub fn with_config(owner: ObjectId, name: impl Into<String>, config: MachineConfig) -> Self {
        Self {
            name: name.into(),
            owner,
            config,
            states: BTreeMap::new(),
            default_state: None,
            current: None,
            sleep_until: 0,
            default_state_inited: false,
            finished: false,
            controls: Controls::default(),
            depth: 0,
            overflows: 0,
            faults: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Register a state under `id`, wire its success and failure targets
    /// and append the given conditions.
    ///
    /// The first state registered becomes the default state. Defining an id
    /// twice is rejected and leaves the original registration in place.
    pub fn define_state<B>(
        &mut self,
        id: impl Into<StateId>,
        behavior: B,
        success: impl Into<Target>,
        failure: impl Into<Target>,
        conditions: Vec<Condition<Env>>,
    ) -> Result<&mut State<Env>, BuildError>
    where
        B: Behavior<Env> + 'static,
    {
        let mut state = State::new(id.into(), Box::new(behavior));
        state.on_success(success);
        state.on_failure(failure);
        for condition in conditions {
            state.add_condition(condition);
        }
        self.insert_state(state)
    }

    pub(crate) fn insert_state(
        &mut self,
        state: State<Env>,
    ) -> Result<&mut State<Env>, BuildError> {
        let id = state.id();
        if self.states.contains_key(&id) {
            tracing::error!(
                machine = %self.name,
                owner = %self.owner,
                state = %id,
                "duplicate state id"
            );
            return Err(BuildError::DuplicateState(id));
        }
        if self.default_state.is_none() {
            self.default_state = Some(id);
        }
        Ok(self.states.entry(id).or_insert(state))
    }

    pub fn state(&self, id: impl Into<StateId>) -> Option<&State<Env>> {
        self.states.get(&id.into())
    }

    pub fn state_mut(&mut self, id: impl Into<StateId>) -> Option<&mut State<Env>> {
        self.states.get_mut(&id.into())
    }

    /// Registered ids in ascending order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_state(&self) -> Option<&State<Env>> {
        self.current.and_then(|id| self.states.get(&id))
    }

    pub fn current_behavior(&self) -> Option<&dyn Behavior<Env>> {
        self.current_state().map(State::behavior)
    }

    pub fn is_in_state(&self, id: impl Into<StateId>) -> bool {
        self.current == Some(id.into())
    }

    pub fn default_state_id(&self) -> Option<StateId> {
        self.default_state
    }

    /// Frame until which the current state sleeps; 0 when awake.
    pub fn sleep_until(&self) -> Frame {
        self.sleep_until
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleep_until != 0
    }

    pub fn is_default_state_inited(&self) -> bool {
        self.default_state_inited
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

    pub fn is_locked(&self) -> bool {
        self.controls.locked
    }

    pub fn locked_by(&self) -> Option<&'static str> {
        self.controls.locked_by
    }

    pub fn phase(&self) -> MachinePhase {
        match self.current {
            Some(_) if self.sleep_until != 0 => MachinePhase::Sleeping,
            Some(_) => MachinePhase::Running,
            None if self.finished => MachinePhase::Done,
            None if self.controls.locked => MachinePhase::Halted,
            None if !self.default_state_inited => MachinePhase::Uninitialized,
            None => MachinePhase::Cleared,
        }
    }

    /// Faults reported since the machine was built or last drained.
    pub fn faults(&self) -> &[MachineFault] {
        &self.faults
    }

    pub fn take_faults(&mut self) -> Vec<MachineFault> {
        std::mem::take(&mut self.faults)
    }

    pub fn wants_debug_output(&self) -> bool {
        self.config.debug_output
    }

    pub fn set_debug_output(&mut self, enabled: bool) {
        self.config.debug_output = enabled;
    }

    /// Block external state changes and goal updates. Internal transitions
    /// driven by `update` keep working.
    pub fn lock(&mut self, locked_by: &'static str) {
        self.controls.locked = true;
        self.controls.locked_by = Some(locked_by);
    }

    pub fn unlock(&mut self) {
        self.controls.locked = false;
        self.controls.locked_by = None;
    }

    /// Stop the machine abruptly: lock it and drop the current state
    /// without running its `on_exit`. Used when the owner itself is going
    /// away and exit side effects must not touch other objects.
    pub fn halt(&mut self) {
        self.lock("halt");
        self.current = None;
        self.sleep_until = 0;
        self.finished = false;
        if self.config.debug_output {
            tracing::debug!(machine = %self.name, owner = %self.owner, "halt");
        }
    }

    /// Make `object` the goal and snapshot its position. `None` leaves the
    /// previous goal untouched. Ignored while locked.
    pub fn set_goal_object<O: Locatable>(&mut self, object: Option<&O>) {
        if self.controls.locked {
            self.reject("set_goal_object");
            return;
        }
        if let Some(object) = object {
            self.controls.goal.track(object);
        }
    }

    /// Overwrite the goal position. Ignored while locked.
    pub fn set_goal_position(&mut self, position: Coord3D) {
        if self.controls.locked {
            self.reject("set_goal_position");
            return;
        }
        self.controls.goal.position = position;
    }

    /// Resolve the goal object through `lookup`. Not cached: a destroyed
    /// object resolves to `None`.
    pub fn goal_object<'l, L: ObjectLookup>(&self, lookup: &'l L) -> Option<&'l L::Object> {
        self.controls.goal.object.and_then(|id| lookup.find_object(id))
    }

    /// `false` if no goal object was ever set, otherwise whether it can no
    /// longer be found.
    pub fn is_goal_object_destroyed<L: ObjectLookup>(&self, lookup: &L) -> bool {
        match self.controls.goal.object {
            None => false,
            Some(id) => lookup.find_object(id).is_none(),
        }
    }

    pub(crate) fn report(&mut self, fault: MachineFault) {
        tracing::error!(
            machine = %self.name,
            owner = %self.owner,
            current = ?self.current,
            %fault,
            "state machine fault"
        );
        self.faults.push(fault);
    }

    fn reject(&self, operation: &'static str) {
        tracing::warn!(
            machine = %self.name,
            owner = %self.owner,
            current = ?self.current,
            locked_by = self.controls.locked_by.unwrap_or("unknown"),
            operation,
            "machine is locked; call ignored"
        );
    }

    /// Run `f` one transition level deeper, or report the overflow and
    /// return `fallback` once the configured depth is reached.
    fn nested<R>(&mut self, fallback: R, f: impl FnOnce(&mut Self) -> R) -> R {
        let limit = self.config.max_transition_depth;
        if self.depth >= limit {
            self.overflows += 1;
            self.report(MachineFault::TransitionDepthExceeded { limit });
            return fallback;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn resolve(&mut self, requested: StateId) -> Option<StateId> {
        if self.states.contains_key(&requested) {
            return Some(requested);
        }
        match self.default_state {
            Some(fallback) => {
                self.report(MachineFault::UnknownState {
                    requested,
                    fallback,
                });
                Some(fallback)
            }
            None => {
                self.report(MachineFault::MissingDefaultState);
                None
            }
        }
    }
}

impl<Env: FrameClock> StateMachine<Env> {
    /// Enter the default state. Allowed once per machine; a second call is
    /// reported and returns `Failure` without touching the current state.
    pub fn init_default_state(&mut self, env: &mut Env) -> StateStatus {
        if self.controls.locked {
            tracing::warn!(
                machine = %self.name,
                owner = %self.owner,
                "initializing a locked machine"
            );
        }
        if self.default_state_inited {
            self.report(MachineFault::DefaultStateAlreadyInited);
            return StateStatus::Failure;
        }
        if self.config.validate_on_init {
            if let Validation::Failure(violations) = self.validate() {
                for violation in violations.iter() {
                    tracing::error!(
                        machine = %self.name,
                        owner = %self.owner,
                        %violation,
                        "invalid transition"
                    );
                }
            }
        }
        self.default_state_inited = true;
        self.internal_set_state(env, Next::Default)
    }

    /// Exit the current state with [`ExitReason::Reset`], clear the goal and
    /// enter the default state again.
    pub fn reset_to_default_state(&mut self, env: &mut Env) -> StateStatus {
        if self.controls.locked {
            self.reject("reset_to_default_state");
            return StateStatus::Failure;
        }
        if !self.default_state_inited {
            self.report(MachineFault::DefaultStateNotInited);
            return StateStatus::Failure;
        }
        if let Some(previous) = self.current {
            self.run_exit(env, previous, ExitReason::Reset);
        }
        self.current = None;
        // cleared before entering so nothing the new state sets is lost
        self.controls.goal.reset();

        let status = self.internal_set_state(env, Next::Default);
        if status == StateStatus::Failure {
            tracing::warn!(
                machine = %self.name,
                owner = %self.owner,
                "default state failed while resetting"
            );
        }
        status
    }

    /// Externally requested transition. Returns `Continue` without doing
    /// anything while the machine is locked.
    pub fn set_state(&mut self, env: &mut Env, id: impl Into<StateId>) -> StateStatus {
        if self.controls.locked {
            self.reject("set_state");
            return StateStatus::Continue;
        }
        self.internal_set_state(env, Next::State(id.into()))
    }

    /// Exit the current state with [`ExitReason::Reset`] and leave the
    /// machine without a state. Ignored while locked.
    pub fn clear(&mut self, env: &mut Env) {
        if self.controls.locked {
            self.reject("clear");
            return;
        }
        if let Some(previous) = self.current {
            self.run_exit(env, previous, ExitReason::Reset);
        }
        self.current = None;
        self.sleep_until = 0;
        self.finished = false;
        self.controls.goal.reset();
    }

    /// Run one logic frame.
    pub fn update(&mut self, env: &mut Env) -> StateStatus {
        let now = env.current_frame();
        if self.sleep_until != 0 && now < self.sleep_until {
            if self.current.is_none() {
                return StateStatus::Failure;
            }
            let remaining = self.sleep_until - now;
            return self.check_for_sleep_transitions(env, StateStatus::Sleep(remaining));
        }

        self.sleep_until = 0;

        let Some(before) = self.current else {
            self.report(MachineFault::NoCurrentState);
            return StateStatus::Failure;
        };

        let Some(mut status) = self.run_update(env, before) else {
            return StateStatus::Failure;
        };

        // the state may have cleared or halted the machine
        let Some(after) = self.current else {
            return StateStatus::Failure;
        };

        // update() moved us elsewhere: whatever it returned describes the
        // old state, so give the new one an immediate evaluation instead
        if after != before {
            status = StateStatus::Continue;
        }

        self.settle(env, now, status)
    }

    fn internal_set_state(&mut self, env: &mut Env, next: Next) -> StateStatus {
        self.sleep_until = 0;

        let target = match next {
            Next::Done => None,
            Next::Default => match self.default_state {
                Some(id) => Some(id),
                None => {
                    self.report(MachineFault::MissingDefaultState);
                    return StateStatus::Failure;
                }
            },
            Next::State(id) => match self.resolve(id) {
                Some(id) => Some(id),
                None => return StateStatus::Failure,
            },
        };

        if self.config.debug_output {
            self.trace_transition(env, target);
        }

        if let Some(previous) = self.current {
            self.run_exit(env, previous, ExitReason::Normal);
        }

        self.current = target;
        self.finished = target.is_none();

        let Some(entered) = target else {
            return StateStatus::Continue;
        };

        let Some(mut status) = self.run_enter(env, entered) else {
            return StateStatus::Failure;
        };

        let Some(current) = self.current else {
            return StateStatus::Failure;
        };
        if current != entered {
            status = StateStatus::Continue;
        }

        let now = env.current_frame();
        self.settle(env, now, status)
    }

    /// Act on the status a state reported: start sleeping and scan the
    /// conditions, or follow the regular transition rules.
    fn settle(&mut self, env: &mut Env, now: Frame, status: StateStatus) -> StateStatus {
        match status {
            StateStatus::Sleep(frames) => {
                self.sleep_until = now.saturating_add(frames);
                let remaining = self.sleep_until - now;
                self.check_for_sleep_transitions(env, StateStatus::Sleep(remaining))
            }
            _ => self.check_for_transitions(env, status),
        }
    }

    fn check_for_transitions(&mut self, env: &mut Env, status: StateStatus) -> StateStatus {
        self.nested(StateStatus::Failure, |machine| {
            let verdict = match machine.current_state() {
                Some(state) => {
                    state.check_for_transitions(status, env, machine.owner, machine.controls.goal)
                }
                None => return status,
            };
            machine.carry_out(env, verdict)
        })
    }

    fn check_for_sleep_transitions(&mut self, env: &mut Env, status: StateStatus) -> StateStatus {
        self.nested(StateStatus::Failure, |machine| {
            let verdict = match machine.current_state() {
                Some(state) => state.check_for_sleep_transitions(
                    status,
                    env,
                    machine.owner,
                    machine.controls.goal,
                ),
                None => return StateStatus::Failure,
            };
            machine.carry_out(env, verdict)
        })
    }

    fn carry_out(&mut self, env: &mut Env, verdict: Verdict) -> StateStatus {
        match verdict {
            Verdict::Stay(status) => status,
            Verdict::Enter(Target::Goto(id)) => self.internal_set_state(env, Next::State(id)),
            Verdict::Enter(_) => self.internal_set_state(env, Next::Default),
            Verdict::Finish(status) => {
                self.internal_set_state(env, Next::Done);
                status
            }
        }
    }

    /// `None` when a transition requested by the state ran past the depth
    /// limit; the caller unwinds with `Failure`.
    fn run_update(&mut self, env: &mut Env, id: StateId) -> Option<StateStatus> {
        let status = match self.states.get_mut(&id) {
            Some(state) => {
                let mut cx = StateContext::new(env, &mut self.controls, self.owner, id);
                state.behavior_mut().update(&mut cx)
            }
            None => return Some(StateStatus::Failure),
        };
        self.apply_requests(env).then_some(status)
    }

    fn run_enter(&mut self, env: &mut Env, id: StateId) -> Option<StateStatus> {
        let status = match self.states.get_mut(&id) {
            Some(state) => {
                let mut cx = StateContext::new(env, &mut self.controls, self.owner, id);
                state.behavior_mut().on_enter(&mut cx)
            }
            None => return Some(StateStatus::Failure),
        };
        self.apply_requests(env).then_some(status)
    }

    fn run_exit(&mut self, env: &mut Env, id: StateId, reason: ExitReason) {
        if let Some(state) = self.states.get_mut(&id) {
            let mut cx = StateContext::new(env, &mut self.controls, self.owner, id);
            state.behavior_mut().on_exit(&mut cx, reason);
        }
        if !self.controls.requests.is_empty() {
            tracing::warn!(
                machine = %self.name,
                owner = %self.owner,
                state = %id,
                dropped = self.controls.requests.len(),
                "transition requests made during on_exit are ignored"
            );
            self.controls.requests.clear();
        }
    }

    /// Carry out the requests a callback queued, in issue order. Their
    /// statuses are discarded; returns `false` if the chain they started
    /// hit the depth limit.
    fn apply_requests(&mut self, env: &mut Env) -> bool {
        if self.controls.requests.is_empty() {
            return true;
        }
        let requests = std::mem::take(&mut self.controls.requests);
        let overflows = self.overflows;
        self.nested((), |machine| {
            for request in requests {
                match request {
                    Request::SetState(id) => {
                        machine.set_state(env, id);
                    }
                    Request::ResetToDefault => {
                        machine.reset_to_default_state(env);
                    }
                    Request::Clear => machine.clear(env),
                    Request::Halt => machine.halt(),
                }
            }
        });
        self.overflows == overflows
    }

    fn trace_transition(&self, env: &Env, target: Option<StateId>) {
        let name_of = |id: Option<StateId>| {
            id.and_then(|id| self.states.get(&id))
                .map(State::name)
                .unwrap_or("<none>")
        };
        tracing::debug!(
            frame = env.current_frame(),
            machine = %self.name,
            owner = %self.owner,
            from = name_of(self.current),
            to = name_of(target),
            "transition"
        );
    }
}

impl<Env> fmt::Debug for StateMachine<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("states", &self.states.len())
            .field("current", &self.current)
            .field("default_state", &self.default_state)
            .field("sleep_until", &self.sleep_until)
            .field("goal", &self.controls.goal)
            .field("locked", &self.controls.locked)
            .finish()
    }
}
