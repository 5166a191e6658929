//! Scripted behaviors and a tiny world for unit tests.

use crate::checkpoint::{self, XferError};
use crate::core::{
    Behavior, Coord3D, ExitReason, Frame, FrameClock, Locatable, ObjectId, ObjectLookup,
    StateContext, StateId, StateStatus,
};
use std::collections::{BTreeMap, VecDeque};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Unit {
    pub id: ObjectId,
    pub position: Coord3D,
}

impl Locatable for Unit {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Coord3D {
        self.position
    }
}

#[derive(Debug, Default)]
pub(crate) struct World {
    pub frame: Frame,
    pub objects: BTreeMap<ObjectId, Unit>,
    pub log: Vec<String>,
    pub alarm: bool,
}

impl World {
    pub fn at(frame: Frame) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn spawn(&mut self, id: u32, position: Coord3D) -> Unit {
        let unit = Unit {
            id: ObjectId(id),
            position,
        };
        self.objects.insert(unit.id, unit.clone());
        unit
    }

    pub fn updates_of(&self, name: &str) -> usize {
        let entry = format!("update:{name}");
        self.log.iter().filter(|line| **line == entry).count()
    }
}

impl FrameClock for World {
    fn current_frame(&self) -> Frame {
        self.frame
    }
}

impl ObjectLookup for World {
    type Object = Unit;

    fn find_object(&self, id: ObjectId) -> Option<&Unit> {
        self.objects.get(&id)
    }
}

/// What a scripted callback asks the machine to do.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Ask {
    SetState(StateId),
    Clear,
    Halt,
}

pub(crate) struct Scripted {
    name: &'static str,
    enter: StateStatus,
    script: VecDeque<StateStatus>,
    fallback: StateStatus,
    on_enter_ask: Option<Ask>,
    on_update_ask: Option<Ask>,
    on_exit_ask: Option<Ask>,
    ticks: u32,
}

impl Scripted {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            enter: StateStatus::Continue,
            script: VecDeque::new(),
            fallback: StateStatus::Continue,
            on_enter_ask: None,
            on_update_ask: None,
            on_exit_ask: None,
            ticks: 0,
        }
    }

    pub fn enters(mut self, status: StateStatus) -> Self {
        self.enter = status;
        self
    }

    /// Status returned by every update once the script ran out.
    pub fn updates(mut self, status: StateStatus) -> Self {
        self.fallback = status;
        self
    }

    pub fn script(mut self, statuses: impl IntoIterator<Item = StateStatus>) -> Self {
        self.script.extend(statuses);
        self
    }

    pub fn asks_on_enter(mut self, ask: Ask) -> Self {
        self.on_enter_ask = Some(ask);
        self
    }

    pub fn asks_on_update(mut self, ask: Ask) -> Self {
        self.on_update_ask = Some(ask);
        self
    }

    pub fn asks_on_exit(mut self, ask: Ask) -> Self {
        self.on_exit_ask = Some(ask);
        self
    }

    fn ask(cx: &mut StateContext<'_, World>, ask: Option<Ask>) {
        match ask {
            Some(Ask::SetState(id)) => cx.set_state(id),
            Some(Ask::Clear) => cx.clear(),
            Some(Ask::Halt) => cx.halt(),
            None => {}
        }
    }
}

impl Behavior<World> for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn on_enter(&mut self, cx: &mut StateContext<'_, World>) -> StateStatus {
        cx.env_mut().log.push(format!("enter:{}", self.name));
        Self::ask(cx, self.on_enter_ask);
        self.enter
    }

    fn update(&mut self, cx: &mut StateContext<'_, World>) -> StateStatus {
        cx.env_mut().log.push(format!("update:{}", self.name));
        self.ticks += 1;
        Self::ask(cx, self.on_update_ask);
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn on_exit(&mut self, cx: &mut StateContext<'_, World>, reason: ExitReason) {
        cx.env_mut().log.push(format!("exit:{}:{:?}", self.name, reason));
        Self::ask(cx, self.on_exit_ask);
    }

    fn save(&self) -> Result<Vec<u8>, XferError> {
        checkpoint::encode(&self.ticks)
    }

    fn load(&mut self, payload: &[u8]) -> Result<(), XferError> {
        self.ticks = checkpoint::decode(payload)?;
        Ok(())
    }
}
