//! Instance lifecycle: spawning, deferred commit, and room swaps.
//!
//! # Commit order
//!
//! After the Collision and custom-event phases, [`commit_pending`] despawns
//! every instance marked [`Destroyed`] and then spawns the queued
//! [`SpawnRequest`]s. Spawned instances carry [`PendingCreate`] and receive
//! their Create event at the start of the next tick.
//!
//! # Room changes
//!
//! A room request is applied after the transition sequencer has advanced.
//! With no transition the swap happens at once; otherwise the sequencer
//! starts and [`advance_room_transition`] performs the swap on the tick the
//! sequencer finishes.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info, warn};

use crate::components::boxcollider::BoxCollider;
use crate::components::continuation::Continuations;
use crate::components::instance::{Destroyed, InstanceId, ObjectRef, PendingCreate, Placement};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::rotation::Rotation;
use crate::components::variables::Variables;
use crate::error::RuntimeError;
use crate::project::{Project, TransitionKind};
use crate::resources::globals::{CurrentRoom, InstanceIdAllocator};
use crate::resources::pending::PendingMutations;
use crate::resources::program::{ObjectIndex, Program};
use crate::resources::roomtransition::RoomTransition;
use crate::resources::runstate::{RunState, RunStatus};
use crate::resources::worldtime::WorldTime;

/// Spawn one instance of `object` at `position` with a fresh id.
pub fn spawn_instance(
    world: &mut World,
    program: &Program,
    object: ObjectIndex,
    position: Vec2,
    placement: Placement,
) -> Entity {
    let id = world.resource_mut::<InstanceIdAllocator>().allocate();
    let definition = program.object(object);
    let entity = world
        .spawn((
            id,
            ObjectRef(object),
            placement,
            MapPosition {
                pos: position,
            },
            RigidBody::default(),
            Rotation::default(),
            BoxCollider::new(definition.size.x, definition.size.y).with_solid(definition.solid),
            Variables::from_declarations(&definition.variables),
            Continuations::default(),
            PendingCreate,
        ))
        .id();
    debug!(
        "Spawned instance {} of {:?} at ({}, {})",
        id.0, definition.id, position.x, position.y
    );
    entity
}

/// Make `room_id` the current room and spawn its placements in order.
pub fn spawn_room(
    world: &mut World,
    program: &Program,
    project: &Project,
    room_id: &str,
) -> Result<(), RuntimeError> {
    let room = project
        .room(room_id)
        .ok_or_else(|| RuntimeError::UnknownRoom(room_id.to_string()))?;

    // Resolve every placement before spawning anything.
    let objects = room
        .instances
        .iter()
        .map(|p| {
            program
                .object_index(&p.object_id)
                .ok_or_else(|| RuntimeError::UnknownObject(p.object_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    *world.resource_mut::<CurrentRoom>() = CurrentRoom {
        id: Some(room.id.clone()),
        size: Vec2::new(room.width, room.height),
    };
    for (placement, object) in room.instances.iter().zip(objects) {
        spawn_instance(
            world,
            program,
            object,
            Vec2::new(placement.x, placement.y),
            Placement {
                label: Some(placement.id.clone()),
                layer: placement.layer,
            },
        );
    }
    info!(
        "Entered room {:?} ({} instances)",
        room.id,
        room.instances.len()
    );
    Ok(())
}

/// Remove every instance, live or destroyed.
pub fn despawn_all_instances(world: &mut World) {
    let mut query = world.query_filtered::<Entity, With<InstanceId>>();
    let entities: Vec<Entity> = query.iter(world).collect();
    for entity in entities {
        world.despawn(entity);
    }
}

/// Phase 4: apply queued destroys, then queued spawns.
pub fn commit_pending(world: &mut World, program: &Program) {
    let (destroys, spawns) = {
        let mut pending = world.resource_mut::<PendingMutations>();
        (
            std::mem::take(&mut pending.destroys),
            std::mem::take(&mut pending.spawns),
        )
    };
    for entity in destroys {
        if world.get::<Destroyed>(entity).is_some() {
            world.despawn(entity);
        }
    }
    for request in spawns {
        spawn_instance(
            world,
            program,
            request.object,
            request.position,
            Placement::default(),
        );
    }
}

/// Replace every instance with those of `room_id`.
pub fn swap_room(
    world: &mut World,
    program: &Program,
    project: &Project,
    room_id: &str,
) -> Result<(), RuntimeError> {
    despawn_all_instances(world);
    world.resource_mut::<PendingMutations>().clear();
    spawn_room(world, program, project, room_id)
}

/// Advance a running transition; swap rooms on the tick it completes.
pub fn advance_room_transition(
    world: &mut World,
    program: &Program,
    project: &Project,
) -> Result<(), RuntimeError> {
    let delta_ms = world.resource::<WorldTime>().delta_ms;
    let finished = world.resource_mut::<RoomTransition>().advance(delta_ms);
    if let Some(room_id) = finished {
        swap_room(world, program, project, &room_id)?;
        world.resource_mut::<RunStatus>().set(RunState::Running);
    }
    Ok(())
}

/// Phase 5: apply this tick's room request, if any.
pub fn apply_room_request(
    world: &mut World,
    program: &Program,
    project: &Project,
) -> Result<(), RuntimeError> {
    let Some(request) = world.resource_mut::<PendingMutations>().room.take() else {
        return Ok(());
    };
    if request.transition == TransitionKind::None {
        return swap_room(world, program, project, &request.room_id);
    }
    let started = world
        .resource_mut::<RoomTransition>()
        .start(request.transition, request.room_id.clone());
    if started {
        world.resource_mut::<RunStatus>().set(RunState::Transitioning);
    } else {
        warn!("Room change to {:?} dropped", request.room_id);
    }
    Ok(())
}
