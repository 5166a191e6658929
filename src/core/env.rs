//! Narrow interfaces to the simulation a machine runs inside.
//!
//! A machine never owns its environment. The owner passes it into every
//! call that may run state callbacks, so the same world can drive many
//! machines in one logic tick.

use super::status::{Coord3D, Frame, ObjectId};

/// Monotonic logic frame counter.
pub trait FrameClock {
    fn current_frame(&self) -> Frame;
}

/// Something a machine can target: it has an id and a position.
pub trait Locatable {
    fn object_id(&self) -> ObjectId;
    fn position(&self) -> Coord3D;
}

/// Resolves object ids to live objects.
///
/// Lookups are best effort; a destroyed object simply resolves to `None`.
pub trait ObjectLookup {
    type Object: Locatable;

    fn find_object(&self, id: ObjectId) -> Option<&Self::Object>;
}
