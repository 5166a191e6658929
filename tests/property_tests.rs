//! Property-based tests for machine scheduling and transitions.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tickmind::checkpoint::{self, XferError};
use tickmind::core::{
    Behavior, Condition, ConditionContext, Coord3D, Frame, FrameClock, Locatable, ObjectId,
    ObjectLookup, StateContext, StateId, StateStatus, Target,
};
use tickmind::runtime::{MachineConfig, MachinePhase, StateMachine};

#[derive(Clone, Debug, PartialEq)]
struct Marker {
    id: ObjectId,
    position: Coord3D,
}

impl Locatable for Marker {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Coord3D {
        self.position
    }
}

#[derive(Default)]
struct Clock {
    frame: Frame,
    updates: Vec<(StateId, Frame)>,
    markers: BTreeMap<ObjectId, Marker>,
}

impl Clock {
    fn place(&mut self, id: u32, position: Coord3D) {
        let id = ObjectId(id);
        self.markers.insert(id, Marker { id, position });
    }
}

impl FrameClock for Clock {
    fn current_frame(&self) -> Frame {
        self.frame
    }
}

impl ObjectLookup for Clock {
    type Object = Marker;

    fn find_object(&self, id: ObjectId) -> Option<&Marker> {
        self.markers.get(&id)
    }
}

/// Reports the same status on every update and counts its updates.
struct Fixed {
    status: StateStatus,
    count: u32,
}

impl Fixed {
    fn new(status: StateStatus) -> Self {
        Self { status, count: 0 }
    }
}

impl Behavior<Clock> for Fixed {
    fn name(&self) -> &str {
        "Fixed"
    }

    fn update(&mut self, cx: &mut StateContext<'_, Clock>) -> StateStatus {
        let entry = (cx.state_id(), cx.frame());
        cx.env_mut().updates.push(entry);
        self.count += 1;
        self.status
    }

    fn save(&self) -> Result<Vec<u8>, XferError> {
        checkpoint::encode(&self.count)
    }

    fn load(&mut self, payload: &[u8]) -> Result<(), XferError> {
        self.count = checkpoint::decode(payload)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum Poke {
    SetState,
    Reset,
    Clear,
    MoveGoal,
    SetGoalObject,
}

prop_compose! {
    fn arbitrary_poke()(variant in 0..5u8) -> Poke {
        match variant {
            0 => Poke::SetState,
            1 => Poke::Reset,
            2 => Poke::Clear,
            3 => Poke::MoveGoal,
            _ => Poke::SetGoalObject,
        }
    }
}

prop_compose! {
    fn arbitrary_position()(x in -100i16..100, y in -100i16..100, z in 0i16..20) -> Coord3D {
        Coord3D::new(f32::from(x), f32::from(y), f32::from(z))
    }
}

fn checked(machine: StateMachine<Clock>) -> StateMachine<Clock> {
    assert!(machine.validate().is_success());
    machine
}

/// One sleeping state and one idle state it can be sent to.
fn pair(sleep: Frame, config: MachineConfig) -> StateMachine<Clock> {
    let mut machine = StateMachine::with_config(ObjectId(1), "pair", config);
    machine
        .define_state(
            StateId(1),
            Fixed::new(StateStatus::Sleep(sleep)),
            StateId(2),
            Target::Default,
            vec![],
        )
        .unwrap();
    machine
        .define_state(
            StateId(2),
            Fixed::new(StateStatus::Continue),
            Target::Default,
            Target::Default,
            vec![],
        )
        .unwrap();
    checked(machine)
}

proptest! {
    #[test]
    fn first_true_condition_decides(flags in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut machine = StateMachine::new(ObjectId(1), "conditions");
        let conditions = flags
            .iter()
            .enumerate()
            .map(|(i, flag)| {
                let flag = *flag;
                Condition::new(
                    move |_: &ConditionContext<'_, Clock>| flag,
                    StateId(i as u32 + 2),
                )
            })
            .collect();
        machine
            .define_state(
                StateId(1),
                Fixed::new(StateStatus::Continue),
                Target::Default,
                Target::Default,
                conditions,
            )
            .unwrap();
        for i in 0..flags.len() {
            machine
                .define_state(
                    StateId(i as u32 + 2),
                    Fixed::new(StateStatus::Continue),
                    Target::Default,
                    Target::Default,
                    vec![],
                )
                .unwrap();
        }
        let mut machine = checked(machine);
        let mut clock = Clock::default();

        machine.init_default_state(&mut clock);

        let expected = flags
            .iter()
            .position(|flag| *flag)
            .map_or(StateId(1), |i| StateId(i as u32 + 2));
        prop_assert_eq!(machine.current_state_id(), Some(expected));
    }

    #[test]
    fn sleeping_state_updates_once_per_period(start in 0u32..1000, sleep in 1u32..50) {
        let mut machine = pair(sleep, MachineConfig::default());
        let mut clock = Clock { frame: start, ..Clock::default() };
        machine.init_default_state(&mut clock);

        for frame in start..=start + 2 * sleep {
            clock.frame = frame;
            machine.update(&mut clock);
        }

        let frames: Vec<Frame> = clock.updates.iter().map(|(_, frame)| *frame).collect();
        prop_assert_eq!(frames, vec![start, start + sleep, start + 2 * sleep]);
    }

    #[test]
    fn states_without_conditions_keep_running(updates in 1usize..30) {
        let mut machine = pair(1, MachineConfig::default());
        let mut clock = Clock::default();
        machine.init_default_state(&mut clock);
        machine.set_state(&mut clock, StateId(2));

        for frame in 0..updates {
            clock.frame = frame as Frame;
            prop_assert_eq!(machine.update(&mut clock), StateStatus::Continue);
        }

        prop_assert!(machine.is_in_state(StateId(2)));
        prop_assert_eq!(clock.updates.len(), updates);
        prop_assert!(machine.faults().is_empty());
    }

    #[test]
    fn halted_machine_ignores_external_calls(
        pokes in prop::collection::vec(arbitrary_poke(), 0..12),
    ) {
        let mut machine = pair(5, MachineConfig::default());
        let mut clock = Clock::default();
        clock.place(7, Coord3D::new(1.0, 2.0, 3.0));
        clock.place(8, Coord3D::new(9.0, 9.0, 9.0));
        machine.init_default_state(&mut clock);
        machine.set_goal_object(clock.find_object(ObjectId(7)));

        machine.halt();

        for poke in pokes {
            match poke {
                Poke::SetState => {
                    let status = machine.set_state(&mut clock, StateId(2));
                    prop_assert_eq!(status, StateStatus::Continue);
                }
                Poke::Reset => {
                    let status = machine.reset_to_default_state(&mut clock);
                    prop_assert_eq!(status, StateStatus::Failure);
                }
                Poke::Clear => machine.clear(&mut clock),
                Poke::MoveGoal => machine.set_goal_position(Coord3D::ZERO),
                Poke::SetGoalObject => machine.set_goal_object(clock.find_object(ObjectId(8))),
            }
            prop_assert_eq!(machine.current_state_id(), None);
            prop_assert!(machine.is_locked());
            prop_assert_eq!(machine.phase(), MachinePhase::Halted);
            prop_assert_eq!(machine.goal_object_id(), Some(ObjectId(7)));
            prop_assert_eq!(machine.goal_position(), Coord3D::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn snapshot_survives_restore(
        sleep in 1u32..10,
        frames in 0u32..40,
        all_states in any::<bool>(),
        goal in prop::option::of((1u32..50, arbitrary_position())),
        locked in any::<bool>(),
    ) {
        let config = MachineConfig {
            snapshot_all_states: all_states,
            ..MachineConfig::default()
        };
        let mut machine = pair(sleep, config.clone());
        let mut clock = Clock::default();
        if let Some((id, position)) = goal {
            clock.place(id, position);
        }
        machine.init_default_state(&mut clock);
        for frame in 0..frames {
            clock.frame = frame;
            machine.update(&mut clock);
        }
        if let Some((id, _)) = goal {
            machine.set_goal_object(clock.find_object(ObjectId(id)));
        }
        if locked {
            machine.lock("cutscene");
        }

        let saved = machine.save().unwrap();
        prop_assert_eq!(saved.locked, locked);
        let mut restored = pair(sleep, config);
        restored.load_bytes(&saved.to_bytes().unwrap()).unwrap();

        prop_assert_eq!(restored.save().unwrap(), saved);
        prop_assert_eq!(restored.phase(), machine.phase());
        prop_assert_eq!(restored.is_locked(), locked);
        prop_assert_eq!(restored.goal_object_id(), goal.map(|(id, _)| ObjectId(id)));
        prop_assert_eq!(restored.goal_position(), machine.goal_position());
    }
}
