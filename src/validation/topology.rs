//! Transition graph validation.

use crate::core::StateId;
use crate::runtime::StateMachine;
use crate::validation::violations::TopologyViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

impl<Env> StateMachine<Env> {
    /// Check every success, failure and condition target against the
    /// registry, accumulating ALL problems instead of stopping at the
    /// first one.
    ///
    /// Exit targets and `Target::Default` always resolve and are never
    /// reported.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TopologyViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<TopologyViolation>>> = Vec::new();

        if self.states.is_empty() {
            checks.push(Validation::fail(TopologyViolation::NoStates));
        }

        if let Some(default) = self.default_state {
            checks.push(self.registered(default, TopologyViolation::UnregisteredDefault(default)));
        }

        for state in self.states.values() {
            for target in state.targets().filter_map(|t| t.state_id()) {
                checks.push(self.registered(
                    target,
                    TopologyViolation::DanglingTarget {
                        state: state.id(),
                        target,
                    },
                ));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn registered(
        &self,
        id: StateId,
        violation: TopologyViolation,
    ) -> Validation<(), NonEmptyVec<TopologyViolation>> {
        if self.states.contains_key(&id) {
            Validation::success(())
        } else {
            Validation::fail(violation)
        }
    }
}
