//! Conditional transition rules.
//!
//! A condition pairs a predicate with a target. A state evaluates its
//! conditions in the order they were added; the first predicate that
//! returns `true` decides the transition.

use super::context::ConditionContext;
use super::status::Target;
use std::fmt;

/// Boxed transition predicate.
///
/// Anything the predicate needs beyond the [`ConditionContext`] (the
/// "user data" of a rule) is captured by the closure.
pub type Predicate<Env> = Box<dyn Fn(&ConditionContext<'_, Env>) -> bool + Send + Sync>;

/// Predicate plus the target it leads to when it holds.
///
/// # Example
///
/// ```rust
/// use tickmind::core::{Condition, ConditionContext, StateId, Target};
///
/// struct World {
///     alarm: bool,
/// }
///
/// let alarm_raised: Condition<World> =
///     Condition::new(|cx: &ConditionContext<'_, World>| cx.env.alarm, StateId(2))
///         .described("alarm raised");
///
/// assert_eq!(alarm_raised.target(), Target::Goto(StateId(2)));
/// assert_eq!(alarm_raised.description(), Some("alarm raised"));
/// ```
pub struct Condition<Env> {
    predicate: Predicate<Env>,
    target: Target,
    description: Option<String>,
}

impl<Env> Condition<Env> {
    pub fn new<F>(predicate: F, target: impl Into<Target>) -> Self
    where
        F: Fn(&ConditionContext<'_, Env>) -> bool + Send + Sync + 'static,
    {
        Condition {
            predicate: Box::new(predicate),
            target: target.into(),
            description: None,
        }
    }

    /// Attach a human-readable description used in diagnostics.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn check(&self, cx: &ConditionContext<'_, Env>) -> bool {
        (self.predicate)(cx)
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl<Env> fmt::Debug for Condition<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("target", &self.target)
            .field("description", &self.description)
            .finish()
    }
}
