//! Save and load of a machine's run-time cursor.
//!
//! A snapshot captures where a machine is, not how it is built: the state
//! registry (behaviors, targets, conditions) is reconstructed by the owner
//! exactly as at build time, and the snapshot is then loaded on top of it.
//! Loading never runs `on_enter`/`on_exit`; the state was already active
//! when the snapshot was taken.
//!
//! Fields are written in a fixed order: version, sleep frame, default
//! state, current state, state payloads, goal object, goal position, lock
//! flag, default-state-initialized flag.

use crate::core::{Coord3D, Frame, ObjectId, State, StateId};
use crate::runtime::StateMachine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::XferError;

/// Version identifier for the snapshot format
pub const XFER_VERSION: u32 = 1;

/// Behavior payloads stored with a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatePayloads {
    /// Only the current state's payload, if there is a current state.
    Current(Option<Vec<u8>>),
    /// Every registered state's payload in ascending id order.
    All(Vec<(StateId, Vec<u8>)>),
}

/// Serializable run-time cursor of a state machine.
/// Does NOT include behaviors or transition rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub version: u32,
    pub sleep_until: Frame,
    pub default_state: Option<StateId>,
    pub current_state: Option<StateId>,
    pub states: StatePayloads,
    pub goal_object: Option<ObjectId>,
    pub goal_position: Coord3D,
    pub locked: bool,
    pub default_state_inited: bool,
}

impl MachineSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, XferError> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, XferError> {
        decode(bytes)
    }

    pub fn to_json(&self) -> Result<String, XferError> {
        serde_json::to_string(self).map_err(|e| XferError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, XferError> {
        serde_json::from_str(json).map_err(|e| XferError::DeserializationFailed(e.to_string()))
    }
}

/// Binary-encode a value; behaviors use this for their own payloads.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, XferError> {
    bincode::serialize(value).map_err(|e| XferError::SerializationFailed(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, XferError> {
    bincode::deserialize(bytes).map_err(|e| XferError::DeserializationFailed(e.to_string()))
}

impl<Env> StateMachine<Env> {
    /// Capture the machine's cursor and its behavior payloads.
    pub fn save(&self) -> Result<MachineSnapshot, XferError> {
        let states = if self.config.snapshot_all_states {
            let payloads = self
                .states
                .values()
                .map(|state| Ok((state.id(), state.behavior().save()?)))
                .collect::<Result<Vec<_>, XferError>>()?;
            StatePayloads::All(payloads)
        } else {
            let payload = self
                .current_state()
                .map(|state| state.behavior().save())
                .transpose()?;
            StatePayloads::Current(payload)
        };

        Ok(MachineSnapshot {
            version: XFER_VERSION,
            sleep_until: self.sleep_until,
            default_state: self.default_state,
            current_state: self.current,
            states,
            goal_object: self.controls.goal.object,
            goal_position: self.controls.goal.position,
            locked: self.controls.locked,
            default_state_inited: self.default_state_inited,
        })
    }

    /// Restore a snapshot into a machine with the same state registry.
    ///
    /// The snapshot is checked against the registry before anything is
    /// touched; any mismatch aborts the load.
    pub fn load(&mut self, snapshot: MachineSnapshot) -> Result<(), XferError> {
        if snapshot.version == 0 || snapshot.version > XFER_VERSION {
            return Err(XferError::UnsupportedVersion {
                found: snapshot.version,
                supported: XFER_VERSION,
            });
        }
        for id in [snapshot.default_state, snapshot.current_state]
            .into_iter()
            .flatten()
        {
            if !self.states.contains_key(&id) {
                return Err(XferError::UnknownState(id));
            }
        }
        if snapshot.sleep_until != 0 && snapshot.current_state.is_none() {
            return Err(XferError::SleepingWithoutState(snapshot.sleep_until));
        }
        if let StatePayloads::All(payloads) = &snapshot.states {
            if payloads.len() != self.states.len() {
                return Err(XferError::StateCountMismatch {
                    expected: self.states.len(),
                    found: payloads.len(),
                });
            }
            for ((found, _), expected) in payloads.iter().zip(self.states.keys()) {
                if found != expected {
                    return Err(XferError::StateIdMismatch {
                        expected: *expected,
                        found: *found,
                    });
                }
            }
        }

        match snapshot.states {
            StatePayloads::All(payloads) => {
                for ((_, payload), state) in payloads.iter().zip(self.states.values_mut()) {
                    load_payload(state, payload)?;
                }
            }
            StatePayloads::Current(Some(payload)) => {
                if let Some(state) = snapshot
                    .current_state
                    .and_then(|id| self.states.get_mut(&id))
                {
                    load_payload(state, &payload)?;
                }
            }
            StatePayloads::Current(None) => {}
        }

        self.sleep_until = snapshot.sleep_until;
        self.default_state = snapshot.default_state;
        self.current = snapshot.current_state;
        self.controls.goal.object = snapshot.goal_object;
        self.controls.goal.position = snapshot.goal_position;
        self.controls.locked = snapshot.locked;
        self.controls.locked_by = snapshot.locked.then_some("load");
        self.controls.requests.clear();
        self.default_state_inited = snapshot.default_state_inited;
        self.finished = false;
        Ok(())
    }

    pub fn save_bytes(&self) -> Result<Vec<u8>, XferError> {
        self.save()?.to_bytes()
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), XferError> {
        self.load(MachineSnapshot::from_bytes(bytes)?)
    }
}

fn load_payload<Env>(state: &mut State<Env>, payload: &[u8]) -> Result<(), XferError> {
    let id = state.id();
    state
        .behavior_mut()
        .load(payload)
        .map_err(|e| XferError::StateLoadFailed {
            state: id,
            reason: e.to_string(),
        })
}
