//! Effects that actions request during the dispatch phases and that the
//! tick applies later.
//!
//! Destroys and spawns are committed after the Collision phase so that no
//! action removes an instance while the current pass is iterating. Room
//! requests are applied after the transition sequencer advances. Custom
//! events are drained after the Collision phase.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;

use crate::project::TransitionKind;
use crate::resources::program::ObjectIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub object: ObjectIndex,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomRequest {
    pub room_id: String,
    pub transition: TransitionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomEmit {
    pub name: String,
    /// Object id of the emitting instance, matched against source filters.
    pub source_object: String,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PendingMutations {
    pub destroys: Vec<Entity>,
    pub spawns: Vec<SpawnRequest>,
    pub room: Option<RoomRequest>,
    pub custom_events: VecDeque<CustomEmit>,
}

impl PendingMutations {
    pub fn destroy(&mut self, entity: Entity) {
        if !self.destroys.contains(&entity) {
            self.destroys.push(entity);
        }
    }

    /// Only the first room request of a tick is kept.
    pub fn request_room(&mut self, request: RoomRequest) -> bool {
        if self.room.is_some() {
            return false;
        }
        self.room = Some(request);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
