//! Collision phase and placement validation.
//!
//! Pairs are computed once per tick from the positions after movement, then
//! dispatched in ascending (self, other) instance id order. A pair is
//! reported when at least one side is solid and the boxes overlap with
//! positive area. Each ordered pair dispatches the Collision events of
//! `self` whose target is `other`'s object. A pair is skipped once either
//! side has been destroyed by an earlier dispatch.
//!
//! [`placement_blocked`] answers the editor's question with the same
//! predicate, using the room document instead of the live world.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::boxcollider::{
    BoxCollider, CollisionBody, overlaps, solid_eligible, would_overlap_solid,
};
use crate::components::instance::{Destroyed, InstanceId, ObjectRef};
use crate::components::mapposition::MapPosition;
use crate::error::RuntimeError;
use crate::project::{EventKind, InstancePlacement, Project};
use crate::resources::program::{ObjectIndex, Program};
use crate::systems::interpreter::{
    EventContext, dispatch_event, is_destroyed, is_suspended, run_halted,
};

/// A live instance as seen by the Collision phase.
#[derive(Debug, Clone, Copy)]
pub struct Collidable {
    pub entity: Entity,
    pub object: ObjectIndex,
    pub body: CollisionBody,
}

/// Collision bodies of live instances in ascending id order.
pub fn collision_bodies(world: &mut World) -> Vec<Collidable> {
    let mut query = world.query_filtered::<
        (Entity, &InstanceId, &ObjectRef, &MapPosition, &BoxCollider),
        Without<Destroyed>,
    >();
    let mut bodies: Vec<Collidable> = query
        .iter(world)
        .map(|(entity, id, object, position, collider)| Collidable {
            entity,
            object: object.0,
            body: CollisionBody {
                id: *id,
                position: position.pos,
                collider: *collider,
            },
        })
        .collect();
    bodies.sort_by_key(|c| c.body.id);
    bodies
}

/// Ordered pairs `(self, other)` of indices into `bodies` that collide.
/// Both orders of a colliding pair are returned.
pub fn collision_pairs(bodies: &[Collidable]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for (j, b) in bodies.iter().enumerate() {
            if i != j && solid_eligible(&a.body, &b.body) && overlaps(&a.body, &b.body) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Phase 3: dispatch Collision events for every colliding pair.
pub fn run_collision_phase(world: &mut World, program: &Program) -> Result<(), RuntimeError> {
    let bodies = collision_bodies(world);
    for (i, j) in collision_pairs(&bodies) {
        let (me, other) = (&bodies[i], &bodies[j]);
        let target = &program.object(other.object).id;
        let slots = program
            .object(me.object)
            .slots_where(|k| matches!(k, EventKind::Collision { target: t } if t == target));
        for slot in slots {
            if is_destroyed(world, me.entity)
                || is_destroyed(world, other.entity)
                || is_suspended(world, me.entity, slot)
            {
                continue;
            }
            dispatch_event(
                world,
                program,
                EventContext {
                    entity: me.entity,
                    object: me.object,
                    slot,
                    other: Some(other.entity),
                },
            )?;
            if run_halted(world) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Whether `candidate` would overlap a solid-eligible placement already in
/// the room. The placement whose id is `exclude` (usually the one being
/// moved) is ignored.
pub fn placement_blocked(
    project: &Project,
    room_id: &str,
    candidate: &InstancePlacement,
    exclude: Option<&str>,
    default_size: Vec2,
) -> Result<bool, RuntimeError> {
    let room = project
        .room(room_id)
        .ok_or_else(|| RuntimeError::UnknownRoom(room_id.to_string()))?;
    let program = Program::compile(project, default_size)?;

    let body_of = |id: InstanceId, placement: &InstancePlacement| {
        let object = program
            .object_index(&placement.object_id)
            .ok_or_else(|| RuntimeError::UnknownObject(placement.object_id.clone()))?;
        let definition = program.object(object);
        Ok::<_, RuntimeError>(CollisionBody {
            id,
            position: Vec2::new(placement.x, placement.y),
            collider: BoxCollider::new(definition.size.x, definition.size.y)
                .with_solid(definition.solid),
        })
    };

    let mut excluded = None;
    let mut others = Vec::with_capacity(room.instances.len());
    for (index, placement) in room.instances.iter().enumerate() {
        let id = InstanceId(index as u32 + 1);
        if exclude == Some(placement.id.as_str()) {
            excluded = Some(id);
        }
        others.push(body_of(id, placement)?);
    }
    let candidate = body_of(InstanceId(0), candidate)?;
    Ok(would_overlap_solid(&candidate, &others, excluded))
}
