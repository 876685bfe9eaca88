//! Event/action interpreter.
//!
//! Dispatching an event walks its item list top to bottom with an explicit
//! stack of [`Frame`]s: an action item executes immediately, an `IfBlock`
//! evaluates its condition and pushes exactly one branch list. A `wait`
//! action stops the walk and parks the remaining frames as a
//! [`Continuation`] on the instance; the Step phase of a later tick resumes
//! it through [`run_frames`].
//!
//! The phase functions ([`run_create_phase`], [`run_step_phase`],
//! [`run_custom_phase`]) each take a snapshot of the live instances in
//! ascending [`InstanceId`] order at phase start and dispatch to them in that
//! order. An instance destroyed after the snapshot was taken receives no
//! further dispatch for the rest of the tick, though the list that destroyed
//! it runs to completion. Every phase returns early once an action has
//! stopped the run.
//!
//! # Related
//!
//! - [`crate::systems::actions`] – execution of individual actions
//! - [`crate::systems::collision`] – the Collision phase

use bevy_ecs::prelude::*;
use log::{debug, warn};
use smallvec::smallvec;

use crate::components::continuation::{Continuation, Continuations, Frame, FrameStack};
use crate::components::instance::{Destroyed, InstanceId, ObjectRef, PendingCreate};
use crate::components::variables::{Variables, to_bool, to_number, to_text};
use crate::error::RuntimeError;
use crate::project::{CmpOp, Condition, EventKind, Operand, Scope, Value, VarType, VariableRef};
use crate::resources::globals::GlobalVariables;
use crate::resources::input::InputBuffer;
use crate::resources::pending::PendingMutations;
use crate::resources::program::{Node, ObjectIndex, Program};
use crate::resources::runstate::{RunState, RunStatus};
use crate::resources::worldtime::WorldTime;
use crate::systems::actions::{Flow, execute_action};

/// Binding of one event invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventContext {
    /// The acting instance (`self`).
    pub entity: Entity,
    pub object: ObjectIndex,
    /// Event slot on the object.
    pub slot: usize,
    /// Collision partner, for Collision events.
    pub other: Option<Entity>,
}

/// True once an action (or error) has stopped the run.
pub fn run_halted(world: &World) -> bool {
    world.resource::<RunStatus>().get() == RunState::Stopped
}

/// Live instances in ascending id order.
pub fn live_instances(world: &mut World) -> Vec<(Entity, InstanceId, ObjectIndex)> {
    let mut query =
        world.query_filtered::<(Entity, &InstanceId, &ObjectRef), Without<Destroyed>>();
    let mut live: Vec<_> = query
        .iter(world)
        .map(|(entity, id, object)| (entity, *id, object.0))
        .collect();
    live.sort_by_key(|(_, id, _)| *id);
    live
}

pub(crate) fn is_destroyed(world: &World, entity: Entity) -> bool {
    world.get::<Destroyed>(entity).is_some()
}

pub(crate) fn is_suspended(world: &World, entity: Entity, slot: usize) -> bool {
    world
        .get::<Continuations>(entity)
        .is_some_and(|c| c.is_suspended(slot))
}

/// Start a new invocation of `ctx.slot` on `ctx.entity`.
pub fn dispatch_event(
    world: &mut World,
    program: &Program,
    ctx: EventContext,
) -> Result<(), RuntimeError> {
    let body = program.object(ctx.object).events[ctx.slot].body;
    run_frames(world, program, ctx, smallvec![Frame { list: body, next: 0 }])
}

/// Execute items from the top frame down until the stack empties, a `wait`
/// suspends the invocation, or the run stops.
pub fn run_frames(
    world: &mut World,
    program: &Program,
    ctx: EventContext,
    mut frames: FrameStack,
) -> Result<(), RuntimeError> {
    loop {
        let Some(top) = frames.last_mut() else {
            return Ok(());
        };
        let list = program.list(top.list);
        if top.next >= list.len() {
            frames.pop();
            continue;
        }
        let item = list[top.next];
        top.next += 1;

        match program.node(item) {
            Node::Action(action) => match execute_action(world, program, &ctx, action)? {
                Flow::Continue => {}
                Flow::Suspend(duration_ms) => {
                    suspend(world, ctx, frames, duration_ms);
                    return Ok(());
                }
                Flow::Halt => return Ok(()),
            },
            Node::If {
                condition,
                then_list,
                else_list,
            } => {
                let branch = if evaluate_condition(world, &ctx, condition)? {
                    *then_list
                } else {
                    *else_list
                };
                frames.push(Frame {
                    list: branch,
                    next: 0,
                });
            }
        }
    }
}

fn suspend(world: &mut World, ctx: EventContext, frames: FrameStack, duration_ms: f64) {
    let issued_frame = world.resource::<WorldTime>().frame_count;
    debug!(
        "Instance {:?} slot {} suspended for {}ms",
        ctx.entity, ctx.slot, duration_ms
    );
    let continuation = Continuation {
        slot: ctx.slot,
        frames,
        duration_ms,
        elapsed_ms: 0.0,
        issued_frame,
        other: ctx.other,
    };
    match world.get_mut::<Continuations>(ctx.entity) {
        Some(mut continuations) => continuations.push(continuation),
        None => {
            world
                .entity_mut(ctx.entity)
                .insert(Continuations {
                    pending: smallvec![continuation],
                });
        }
    }
}

/// Look up a variable and its declared type in the given scope of `entity`.
pub fn lookup_variable(
    world: &World,
    entity: Entity,
    var: &VariableRef,
) -> Result<(Value, VarType), RuntimeError> {
    let vars = match var.scope {
        Scope::Global => Some(&world.resource::<GlobalVariables>().0),
        Scope::Object => world.get::<Variables>(entity),
    };
    vars.and_then(|vars| Some((vars.get(&var.id)?.clone(), vars.var_type(&var.id)?)))
        .ok_or_else(|| RuntimeError::UnknownVariable {
            scope: var.scope,
            id: var.id.clone(),
        })
}

/// Assign `value` (coerced to the declared type) to a variable.
pub fn assign_variable(
    world: &mut World,
    entity: Entity,
    var: &VariableRef,
    value: &Value,
) -> Result<(), RuntimeError> {
    let assigned = match var.scope {
        Scope::Global => world
            .resource_mut::<GlobalVariables>()
            .0
            .assign(&var.id, value),
        Scope::Object => world
            .get_mut::<Variables>(entity)
            .is_some_and(|mut vars| vars.assign(&var.id, value)),
    };
    if assigned {
        Ok(())
    } else {
        Err(RuntimeError::UnknownVariable {
            scope: var.scope,
            id: var.id.clone(),
        })
    }
}

/// Resolve an operand to a value.
pub fn resolve(world: &World, ctx: &EventContext, operand: &Operand) -> Result<Value, RuntimeError> {
    match operand {
        Operand::Literal { literal } => Ok(literal.clone()),
        Operand::Variable { variable } => {
            lookup_variable(world, ctx.entity, variable).map(|(value, _)| value)
        }
        Operand::Key { key, state } => Ok(Value::Bool(
            world.resource::<InputBuffer>().query(key, *state),
        )),
    }
}

/// Resolve an operand and coerce it to a number.
pub fn resolve_number(
    world: &World,
    ctx: &EventContext,
    operand: &Operand,
) -> Result<f64, RuntimeError> {
    resolve(world, ctx, operand).map(|v| to_number(&v))
}

/// Apply `op`. A numeric left side compares numerically against the right
/// side coerced to a number; any other left side supports only `==`/`!=`,
/// comparing against the right side coerced to the left's type.
pub fn compare(left: &Value, op: CmpOp, right: &Value) -> bool {
    if let Value::Number(l) = left {
        let r = to_number(right);
        return match op {
            CmpOp::Eq => *l == r,
            CmpOp::Ne => *l != r,
            CmpOp::Lt => *l < r,
            CmpOp::Le => *l <= r,
            CmpOp::Gt => *l > r,
            CmpOp::Ge => *l >= r,
        };
    }
    let equal = match left {
        Value::Bool(l) => *l == to_bool(right),
        Value::Text(l) => *l == to_text(right),
        Value::Number(_) => unreachable!("numbers handled above"),
    };
    match op {
        CmpOp::Eq => equal,
        CmpOp::Ne => !equal,
        _ => false,
    }
}

pub fn evaluate_condition(
    world: &World,
    ctx: &EventContext,
    condition: &Condition,
) -> Result<bool, RuntimeError> {
    let left = resolve(world, ctx, &condition.left)?;
    let right = resolve(world, ctx, &condition.right)?;
    Ok(compare(&left, condition.op, &right))
}

/// Phase 1: the Create event of every instance that has not had one yet.
pub fn run_create_phase(world: &mut World, program: &Program) -> Result<(), RuntimeError> {
    let mut query = world.query_filtered::<(Entity, &InstanceId, &ObjectRef), (
        With<PendingCreate>,
        Without<Destroyed>,
    )>();
    let mut fresh: Vec<_> = query
        .iter(world)
        .map(|(entity, id, object)| (entity, *id, object.0))
        .collect();
    fresh.sort_by_key(|(_, id, _)| *id);

    for (entity, _, object) in fresh {
        world.entity_mut(entity).remove::<PendingCreate>();
        for slot in program
            .object(object)
            .slots_where(|k| matches!(k, EventKind::Create))
        {
            if is_destroyed(world, entity) || is_suspended(world, entity, slot) {
                continue;
            }
            dispatch_event(
                world,
                program,
                EventContext {
                    entity,
                    object,
                    slot,
                    other: None,
                },
            )?;
            if run_halted(world) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Phase 2: resume due continuations, then the Step events of every
/// instance whose Step slot is not suspended.
pub fn run_step_phase(world: &mut World, program: &Program) -> Result<(), RuntimeError> {
    let (delta_ms, frame) = {
        let time = world.resource::<WorldTime>();
        (time.delta_ms, time.frame_count)
    };

    for (entity, _, object) in live_instances(world) {
        let due = match world.get_mut::<Continuations>(entity) {
            Some(mut continuations) => continuations.advance(delta_ms, frame),
            None => Vec::new(),
        };
        for continuation in due {
            if is_destroyed(world, entity) {
                break;
            }
            debug!(
                "Instance {:?} slot {} resumed after {}ms",
                entity, continuation.slot, continuation.elapsed_ms
            );
            let other = continuation
                .other
                .filter(|other| world.get_entity(*other).is_ok());
            run_frames(
                world,
                program,
                EventContext {
                    entity,
                    object,
                    slot: continuation.slot,
                    other,
                },
                continuation.frames,
            )?;
            if run_halted(world) {
                return Ok(());
            }
        }

        for slot in program
            .object(object)
            .slots_where(|k| matches!(k, EventKind::Step))
        {
            if is_destroyed(world, entity) || is_suspended(world, entity, slot) {
                continue;
            }
            dispatch_event(
                world,
                program,
                EventContext {
                    entity,
                    object,
                    slot,
                    other: None,
                },
            )?;
            if run_halted(world) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Custom events queued by `emitCustomEvent`, drained in rounds. Events
/// emitted while draining go to the next round; whatever is left after
/// `max_rounds` carries over to the next tick.
pub fn run_custom_phase(
    world: &mut World,
    program: &Program,
    max_rounds: u32,
) -> Result<(), RuntimeError> {
    for _ in 0..max_rounds {
        let round: Vec<_> = world
            .resource_mut::<PendingMutations>()
            .custom_events
            .drain(..)
            .collect();
        if round.is_empty() {
            return Ok(());
        }
        let live = live_instances(world);
        for emit in round {
            for (entity, _, object) in &live {
                let slots = program.object(*object).slots_where(|k| match k {
                    EventKind::Custom {
                        name,
                        source_object,
                    } => {
                        *name == emit.name
                            && source_object
                                .as_deref()
                                .is_none_or(|src| src == emit.source_object)
                    }
                    _ => false,
                });
                for slot in slots {
                    if is_destroyed(world, *entity) || is_suspended(world, *entity, slot) {
                        continue;
                    }
                    dispatch_event(
                        world,
                        program,
                        EventContext {
                            entity: *entity,
                            object: *object,
                            slot,
                            other: None,
                        },
                    )?;
                    if run_halted(world) {
                        return Ok(());
                    }
                }
            }
        }
    }
    let left = world.resource::<PendingMutations>().custom_events.len();
    if left > 0 {
        warn!(
            "{} custom event(s) still queued after {} rounds; deferring to next tick",
            left, max_rounds
        );
    }
    Ok(())
}
