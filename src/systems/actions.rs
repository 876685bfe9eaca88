//! Execution of individual actions.
//!
//! [`execute_action`] matches [`Action`] exhaustively. Most actions apply
//! their effect to the world immediately; destroys, spawns, room changes and
//! custom events are queued on [`PendingMutations`] and applied later in the
//! tick. The returned [`Flow`] tells the interpreter whether to keep walking
//! the item list.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, warn};

use crate::components::boxcollider::BoxCollider;
use crate::components::instance::Destroyed;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::rotation::Rotation;
use crate::components::variables::{to_number, to_text};
use crate::error::RuntimeError;
use crate::events::gameended::GameEndedEvent;
use crate::events::sound::SoundCmd;
use crate::project::{Action, ChangeOp, TransitionKind, Value, VarType};
use crate::resources::globals::{CurrentRoom, RandomSource, Score};
use crate::resources::pending::{CustomEmit, PendingMutations, RoomRequest, SpawnRequest};
use crate::resources::program::{Program, ProjectRes};
use crate::resources::runstate::RunStatus;
use crate::resources::runtimeconfig::RuntimeConfig;
use crate::resources::toast::ToastQueue;
use crate::systems::interpreter::{
    EventContext, assign_variable, lookup_variable, resolve, resolve_number,
};

/// What the interpreter does after an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    /// Park the rest of the invocation for this many milliseconds.
    Suspend(f64),
    /// The run ended; abandon the invocation.
    Halt,
}

pub fn execute_action(
    world: &mut World,
    program: &Program,
    ctx: &EventContext,
    action: &Action,
) -> Result<Flow, RuntimeError> {
    match action {
        Action::Move { dx, dy } => {
            let delta = Vec2::new(
                resolve_number(world, ctx, dx)? as f32,
                resolve_number(world, ctx, dy)? as f32,
            );
            if let Some(mut position) = world.get_mut::<MapPosition>(ctx.entity) {
                position.pos += delta;
            }
        }
        Action::SetVelocity { vx, vy } => {
            let velocity = Vec2::new(
                resolve_number(world, ctx, vx)? as f32,
                resolve_number(world, ctx, vy)? as f32,
            );
            if let Some(mut body) = world.get_mut::<RigidBody>(ctx.entity) {
                body.velocity = velocity;
            }
        }
        Action::Rotate { degrees } => {
            let degrees = resolve_number(world, ctx, degrees)? as f32;
            if let Some(mut rotation) = world.get_mut::<Rotation>(ctx.entity) {
                rotation.rotate_by(degrees);
            }
        }
        Action::MoveToward { x, y, speed } => {
            let target = Vec2::new(
                resolve_number(world, ctx, x)? as f32,
                resolve_number(world, ctx, y)? as f32,
            );
            let speed = (resolve_number(world, ctx, speed)? as f32).max(0.0);
            if let Some(mut position) = world.get_mut::<MapPosition>(ctx.entity) {
                position.pos = step_toward(position.pos, target, speed);
            }
        }
        Action::ClampToRoom => {
            let room = world.resource::<CurrentRoom>().size;
            let collider = world
                .get::<BoxCollider>(ctx.entity)
                .copied()
                .unwrap_or(BoxCollider::new(0.0, 0.0));
            if let Some(mut position) = world.get_mut::<MapPosition>(ctx.entity) {
                position.pos = clamp_into(position.pos, &collider, room);
            }
        }
        Action::Teleport { x, y } => {
            let target = Vec2::new(
                resolve_number(world, ctx, x)? as f32,
                resolve_number(world, ctx, y)? as f32,
            );
            if let Some(mut position) = world.get_mut::<MapPosition>(ctx.entity) {
                position.pos = target;
            }
        }
        Action::DestroySelf => mark_destroyed(world, ctx.entity),
        Action::DestroyOther => match ctx.other {
            Some(other) if world.get_entity(other).is_ok() => mark_destroyed(world, other),
            _ => debug!("destroyOther outside a collision ignored"),
        },
        Action::SpawnObject {
            object_id,
            x,
            y,
            relative,
        } => {
            let object = program
                .object_index(object_id)
                .ok_or_else(|| RuntimeError::UnknownObject(object_id.clone()))?;
            let mut position = Vec2::new(
                resolve_number(world, ctx, x)? as f32,
                resolve_number(world, ctx, y)? as f32,
            );
            if *relative {
                if let Some(origin) = world.get::<MapPosition>(ctx.entity) {
                    position += origin.pos;
                }
            }
            world
                .resource_mut::<PendingMutations>()
                .spawns
                .push(SpawnRequest { object, position });
        }
        Action::ChangeScore { delta } => {
            let delta = resolve_number(world, ctx, delta)?;
            world.resource_mut::<Score>().0 += delta;
        }
        Action::EndGame { message } => {
            world.resource_mut::<RunStatus>().end(message.clone());
            world.trigger(GameEndedEvent {
                message: message.clone(),
            });
            return Ok(Flow::Halt);
        }
        Action::Message { text, duration_ms } => {
            let duration = match duration_ms {
                Some(operand) => resolve_number(world, ctx, operand)?,
                None => world.resource::<RuntimeConfig>().default_toast_ms,
            };
            world.resource_mut::<ToastQueue>().enqueue(text.clone(), duration);
        }
        Action::PlaySound { sound_id } => {
            world
                .resource_mut::<Messages<SoundCmd>>()
                .write(SoundCmd {
                    sound_id: sound_id.clone(),
                });
        }
        Action::ChangeVariable { target, op, value } => {
            let (current, var_type) = lookup_variable(world, ctx.entity, target)?;
            let operand = resolve(world, ctx, value)?;
            let next = apply_change(&current, var_type, *op, &operand);
            assign_variable(world, ctx.entity, target, &next)?;
        }
        Action::RandomizeVariable {
            target,
            min,
            max,
            integer,
        } => {
            let min = resolve_number(world, ctx, min)?;
            let max = resolve_number(world, ctx, max)?;
            let value = world.resource_mut::<RandomSource>().range(min, max, *integer);
            assign_variable(world, ctx.entity, target, &Value::Number(value))?;
        }
        Action::CopyVariable { source, target } => {
            let (value, _) = lookup_variable(world, ctx.entity, source)?;
            assign_variable(world, ctx.entity, target, &value)?;
        }
        Action::GoToRoom {
            room_id,
            transition,
        } => request_room(world, room_id.clone(), *transition)?,
        Action::RestartRoom { transition } => {
            let current = world.resource::<CurrentRoom>().id.clone();
            match current {
                Some(room_id) => request_room(world, room_id, *transition)?,
                None => warn!("restartRoom with no current room ignored"),
            }
        }
        Action::Wait { duration_ms } => {
            let duration = resolve_number(world, ctx, duration_ms)?.max(0.0);
            return Ok(Flow::Suspend(duration));
        }
        Action::EmitCustomEvent { name } => {
            let source_object = program.object(ctx.object).id.clone();
            debug!("Custom event {:?} emitted by {:?}", name, source_object);
            world
                .resource_mut::<PendingMutations>()
                .custom_events
                .push_back(CustomEmit {
                    name: name.clone(),
                    source_object,
                });
        }
    }
    Ok(Flow::Continue)
}

fn mark_destroyed(world: &mut World, entity: Entity) {
    world.entity_mut(entity).insert(Destroyed);
    world.resource_mut::<PendingMutations>().destroy(entity);
}

fn request_room(
    world: &mut World,
    room_id: String,
    transition: TransitionKind,
) -> Result<(), RuntimeError> {
    if world.resource::<ProjectRes>().0.room(&room_id).is_none() {
        return Err(RuntimeError::UnknownRoom(room_id));
    }
    let accepted = world
        .resource_mut::<PendingMutations>()
        .request_room(RoomRequest {
            room_id: room_id.clone(),
            transition,
        });
    if !accepted {
        warn!("Room change to {:?} ignored: another change is pending", room_id);
    }
    Ok(())
}

/// Move from `from` toward `to` by at most `speed`, landing exactly on `to`
/// when it is within reach.
pub fn step_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= speed || distance == 0.0 {
        to
    } else {
        from + delta / distance * speed
    }
}

/// Position that keeps the collider box inside a room of `room` size.
pub fn clamp_into(position: Vec2, collider: &BoxCollider, room: Vec2) -> Vec2 {
    let min = -collider.offset;
    let max = (room - collider.size - collider.offset).max(min);
    position.clamp(min, max)
}

/// Result of `changeVariable` before it is coerced to the declared type.
///
/// Arithmetic works on numbers; `add` on a string concatenates and `toggle`
/// flips booleans (and numbers between 0 and 1). Operations that make no
/// sense for the declared type fall back to `set`.
pub fn apply_change(current: &Value, var_type: VarType, op: ChangeOp, operand: &Value) -> Value {
    match (var_type, op) {
        (_, ChangeOp::Set) => operand.clone(),
        (VarType::Number, ChangeOp::Add) => Value::Number(to_number(current) + to_number(operand)),
        (VarType::Number, ChangeOp::Subtract) => {
            Value::Number(to_number(current) - to_number(operand))
        }
        (VarType::Number, ChangeOp::Multiply) => {
            Value::Number(to_number(current) * to_number(operand))
        }
        (VarType::Number, ChangeOp::Divide) => {
            Value::Number(to_number(current) / to_number(operand))
        }
        (VarType::Number, ChangeOp::Toggle) => {
            Value::Number(if to_number(current) == 0.0 { 1.0 } else { 0.0 })
        }
        (VarType::String, ChangeOp::Add) => {
            Value::Text(format!("{}{}", to_text(current), to_text(operand)))
        }
        (VarType::Boolean, ChangeOp::Toggle) => {
            Value::Bool(!matches!(current, Value::Bool(true)))
        }
        _ => operand.clone(),
    }
}
