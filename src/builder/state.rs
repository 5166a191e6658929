//! Builder for a single state.

use crate::core::{Behavior, Condition, ConditionContext, State, StateId, Target};

/// Fluent description of one state: its behavior, where success and
/// failure lead, and its conditional transitions in evaluation order.
///
/// Unset success and failure targets lead back to the default state.
pub struct StateBuilder<Env> {
    id: StateId,
    behavior: Box<dyn Behavior<Env>>,
    success: Target,
    failure: Target,
    conditions: Vec<Condition<Env>>,
}

impl<Env> StateBuilder<Env> {
    pub fn new<B>(id: impl Into<StateId>, behavior: B) -> Self
    where
        B: Behavior<Env> + 'static,
    {
        Self {
            id: id.into(),
            behavior: Box::new(behavior),
            success: Target::Default,
            failure: Target::Default,
            conditions: Vec::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn on_success(mut self, target: impl Into<Target>) -> Self {
        self.success = target.into();
        self
    }

    pub fn on_failure(mut self, target: impl Into<Target>) -> Self {
        self.failure = target.into();
        self
    }

    /// Add a conditional transition using a closure.
    pub fn when<F>(self, predicate: F, target: impl Into<Target>) -> Self
    where
        F: Fn(&ConditionContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        self.condition(Condition::new(predicate, target))
    }

    /// Like [`when`](Self::when), with a description shown in diagnostics.
    pub fn when_described<F>(
        self,
        description: &str,
        predicate: F,
        target: impl Into<Target>,
    ) -> Self
    where
        F: Fn(&ConditionContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        self.condition(Condition::new(predicate, target).described(description))
    }

    /// Add a pre-built condition.
    pub fn condition(mut self, condition: Condition<Env>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub(crate) fn build(self) -> State<Env> {
        let mut state = State::new(self.id, self.behavior);
        state.on_success(self.success);
        state.on_failure(self.failure);
        for condition in self.conditions {
            state.add_condition(condition);
        }
        state
    }
}
