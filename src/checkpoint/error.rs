//! Save/load error types.

use crate::core::{Frame, StateId};
use thiserror::Error;

/// Errors that can occur while saving or loading a machine.
///
/// Every load error is fatal for the load and the machine's cursor is left
/// as it was before the call. Behaviors that already accepted their
/// payloads keep them, so callers are expected to abandon the machine.
#[derive(Debug, Error)]
pub enum XferError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("State count mismatch: {expected} expected, {found} read")]
    StateCountMismatch { expected: usize, found: usize },

    #[error("State id mismatch: {expected} expected, {found} read")]
    StateIdMismatch { expected: StateId, found: StateId },

    #[error("Snapshot refers to undefined state {0}")]
    UnknownState(StateId),

    /// A sleep deadline was saved without a state to wake up
    #[error("Snapshot sleeps until frame {0} but has no current state")]
    SleepingWithoutState(Frame),

    /// A behavior rejected its saved payload
    #[error("State {state} failed to load: {reason}")]
    StateLoadFailed { state: StateId, reason: String },
}
