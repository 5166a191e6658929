//! Per-machine tuning knobs.

use serde::{Deserialize, Serialize};

/// Transition chains deeper than this are treated as runaway loops.
pub const DEFAULT_MAX_TRANSITION_DEPTH: usize = 20;

/// Configuration of a single state machine.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use tickmind::runtime::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str(r#"{ "debug_output": true }"#).unwrap();
/// assert!(config.debug_output);
/// assert_eq!(config.max_transition_depth, 20);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Bound on nested transition evaluation within one call.
    pub max_transition_depth: usize,

    /// Save every registered state's payload instead of only the current one.
    pub snapshot_all_states: bool,

    /// Emit a `debug` event for every transition of this machine.
    pub debug_output: bool,

    /// Run topology validation when the default state is initialized.
    pub validate_on_init: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_transition_depth: DEFAULT_MAX_TRANSITION_DEPTH,
            snapshot_all_states: false,
            debug_output: false,
            validate_on_init: cfg!(debug_assertions),
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_depth_matches_constant() {
        assert_eq!(
            MachineConfig::default().max_transition_depth,
            DEFAULT_MAX_TRANSITION_DEPTH
        );
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = MachineConfig::from_json("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = MachineConfig::from_json(
            r#"{ "max_transition_depth": 4, "snapshot_all_states": true }"#,
        )
        .unwrap();

        assert_eq!(config.max_transition_depth, 4);
        assert!(config.snapshot_all_states);
        assert!(!config.debug_output);
    }
}
