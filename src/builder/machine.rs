//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::core::ObjectId;
use crate::runtime::{MachineConfig, StateMachine};
use stillwater::validation::Validation;

/// Builder for constructing state machines with a fluent API.
///
/// States are registered in the order they are added; the first one
/// becomes the default state.
pub struct StateMachineBuilder<Env> {
    name: String,
    owner: ObjectId,
    config: MachineConfig,
    states: Vec<StateBuilder<Env>>,
    validate: bool,
}

impl<Env> StateMachineBuilder<Env> {
    /// Create a new builder for a machine animating `owner`.
    pub fn new(owner: ObjectId) -> Self {
        Self {
            name: String::from("machine"),
            owner,
            config: MachineConfig::default(),
            states: Vec::new(),
            validate: true,
        }
    }

    /// Name used in diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a state.
    pub fn state(mut self, state: StateBuilder<Env>) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = StateBuilder<Env>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Check the transition graph in [`build`](Self::build). On by default.
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Build the state machine.
    /// Returns an error if no states were added, an id repeats, or (with
    /// validation on) any target names an unregistered state.
    pub fn build(self) -> Result<StateMachine<Env>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut machine = StateMachine::with_config(self.owner, self.name, self.config);
        for state in self.states {
            machine.insert_state(state.build())?;
        }

        if self.validate {
            if let Validation::Failure(violations) = machine.validate() {
                return Err(BuildError::InvalidTopology(violations.iter().cloned().collect()));
            }
        }

        Ok(machine)
    }
}
