//! The runtime facade a host drives.
//!
//! [`Runtime`] owns the ECS [`World`] of one run and advances it one tick
//! at a time. The host feeds key events between ticks, drains sound
//! requests, and reads a [`Snapshot`] to draw.
//!
//! # Tick order
//!
//! 1. Create events of instances spawned since the last tick
//! 2. Resume due waits, Step events, then velocity integration
//! 3. Collision events, then the custom-event rounds
//! 4. Commit destroys, then spawns
//! 5. Advance toasts and the room transition, apply the room request
//! 6. Clear input edges
//!
//! Steps 1 to 3 are skipped while a room transition runs. An `endGame`
//! stops the tick where it happens.
//!
//! # Errors
//!
//! Every [`RuntimeError`] is fatal to the run: it is logged, counted in
//! [`Runtime::error_count`], the run enters [`RunState::Stopped`], and the
//! error is returned to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::{error, info};
use serde::Serialize;

use crate::components::boxcollider::BoxCollider;
use crate::components::continuation::Continuations;
use crate::components::instance::{Destroyed, InstanceId, ObjectRef, Placement};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::rotation::Rotation;
use crate::components::variables::Variables;
use crate::error::RuntimeError;
use crate::events::gameended::log_game_ended;
use crate::events::sound::SoundCmd;
use crate::project::{InstancePlacement, Project, Value};
use crate::resources::globals::{
    CurrentRoom, GlobalVariables, InstanceIdAllocator, RandomSource, Score,
};
use crate::resources::input::InputBuffer;
use crate::resources::pending::PendingMutations;
use crate::resources::program::{Program, ProgramRes, ProjectRes};
use crate::resources::roomtransition::RoomTransition;
use crate::resources::runstate::{RunState, RunStatus};
use crate::resources::runtimeconfig::RuntimeConfig;
use crate::resources::toast::ToastQueue;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::{placement_blocked, run_collision_phase};
use crate::systems::input::clear_input_edges;
use crate::systems::interpreter::{
    run_create_phase, run_custom_phase, run_halted, run_step_phase,
};
use crate::systems::lifecycle::{
    advance_room_transition, apply_room_request, commit_pending, despawn_all_instances,
    spawn_room,
};
use crate::systems::movement::movement_system;
use crate::systems::time::update_world_time;
use crate::systems::toast::advance_toasts;

/// One instance as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSnapshot {
    pub id: InstanceId,
    pub object_id: String,
    /// Placement id for room instances, `None` for spawned ones.
    pub placement_id: Option<String>,
    pub layer: Option<i32>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub rotation: f32,
    pub variables: BTreeMap<String, Value>,
    /// Number of event slots waiting on a `wait`.
    pub suspended: usize,
}

/// Read-only view of the run after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: RunState,
    pub frame: u64,
    pub elapsed_ms: f64,
    pub score: f64,
    pub room: Option<String>,
    /// Live instances in ascending id order.
    pub instances: Vec<InstanceSnapshot>,
    pub globals: BTreeMap<String, Value>,
    pub toast: ToastQueue,
    pub transition: RoomTransition,
    /// The `endGame` message, once the game has ended.
    pub ended: Option<String>,
    pub error_count: u64,
}

impl Snapshot {
    pub fn instance(&self, id: u32) -> Option<&InstanceSnapshot> {
        self.instances.iter().find(|i| i.id.0 == id)
    }
}

pub struct Runtime {
    world: World,
    motion: Schedule,
    housekeeping: Schedule,
    error_count: u64,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(RandomSource::new(config.seed));
        world.insert_resource(config);
        world.insert_resource(WorldTime::default().with_time_scale(1.0));
        world.init_resource::<InputBuffer>();
        world.init_resource::<ToastQueue>();
        world.init_resource::<RoomTransition>();
        world.init_resource::<RunStatus>();
        world.init_resource::<GlobalVariables>();
        world.init_resource::<Score>();
        world.init_resource::<CurrentRoom>();
        world.init_resource::<InstanceIdAllocator>();
        world.init_resource::<PendingMutations>();
        world.init_resource::<ProgramRes>();
        world.init_resource::<ProjectRes>();
        world.init_resource::<Messages<SoundCmd>>();

        world.spawn(Observer::new(log_game_ended));
        world.flush();

        let mut motion = Schedule::default();
        motion.add_systems(movement_system);

        let mut housekeeping = Schedule::default();
        housekeeping.add_systems((advance_toasts, clear_input_edges).chain());

        Self {
            world,
            motion,
            housekeeping,
            error_count: 0,
        }
    }

    /// Begin a run of `project` in `room_id`. Any previous run is reset.
    pub fn start(&mut self, project: &Project, room_id: &str) -> Result<(), RuntimeError> {
        self.reset();

        let default_size = self.world.resource::<RuntimeConfig>().default_size();
        let program = match Program::compile(project, default_size) {
            Ok(program) => Arc::new(program),
            Err(e) => return Err(self.fail(e)),
        };
        let project = Arc::new(project.clone());
        self.world.insert_resource(ProgramRes(program.clone()));
        self.world.insert_resource(ProjectRes(project.clone()));
        self.world.insert_resource(GlobalVariables(Variables::from_declarations(
            &project.variables,
        )));
        let seed = self.world.resource::<RuntimeConfig>().seed;
        self.world.insert_resource(RandomSource::new(seed));

        if let Err(e) = spawn_room(&mut self.world, &program, &project, room_id) {
            return Err(self.fail(e));
        }
        self.world.resource_mut::<RunStatus>().set(RunState::Running);
        info!("Run started in room {:?}", room_id);
        Ok(())
    }

    /// Advance the run by `delta_ms` milliseconds.
    ///
    /// A negative or non-finite delta is rejected and stops the run. Ticks
    /// outside a live run do nothing.
    pub fn tick(&mut self, delta_ms: f64) -> Result<(), RuntimeError> {
        if !delta_ms.is_finite() {
            return Err(self.fail(RuntimeError::NonFiniteDelta));
        }
        if delta_ms < 0.0 {
            return Err(self.fail(RuntimeError::NegativeDelta(delta_ms)));
        }
        if !self.state().is_live() {
            return Ok(());
        }
        self.run_tick(delta_ms).map_err(|e| self.fail(e))
    }

    fn run_tick(&mut self, delta_ms: f64) -> Result<(), RuntimeError> {
        update_world_time(&mut self.world, delta_ms);
        let program = self.world.resource::<ProgramRes>().0.clone();
        let project = self.world.resource::<ProjectRes>().0.clone();
        let max_rounds = self
            .world
            .resource::<RuntimeConfig>()
            .max_custom_event_rounds;

        if !self.world.resource::<RoomTransition>().in_progress() {
            run_create_phase(&mut self.world, &program)?;
            if run_halted(&self.world) {
                return Ok(());
            }
            run_step_phase(&mut self.world, &program)?;
            if run_halted(&self.world) {
                return Ok(());
            }
            self.motion.run(&mut self.world);
            run_collision_phase(&mut self.world, &program)?;
            if run_halted(&self.world) {
                return Ok(());
            }
            run_custom_phase(&mut self.world, &program, max_rounds)?;
            if run_halted(&self.world) {
                return Ok(());
            }
        }

        commit_pending(&mut self.world, &program);
        advance_room_transition(&mut self.world, &program, &project)?;
        apply_room_request(&mut self.world, &program, &project)?;
        self.housekeeping.run(&mut self.world);
        self.world.clear_trackers();
        Ok(())
    }

    fn fail(&mut self, e: RuntimeError) -> RuntimeError {
        if e.is_configuration() {
            error!("Configuration error, stopping run: {}", e);
        } else {
            error!("Runtime error, stopping run: {}", e);
        }
        self.error_count += 1;
        self.stop();
        e
    }

    pub fn key_down(&mut self, key: &str) {
        self.world.resource_mut::<InputBuffer>().key_down(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.world.resource_mut::<InputBuffer>().key_up(key);
    }

    /// Release every held key, e.g. on focus loss.
    pub fn release_all_keys(&mut self) {
        self.world.resource_mut::<InputBuffer>().release_all();
    }

    /// Halt the run. Instances stay in place for inspection; pending waits,
    /// input, toasts and transitions are dropped.
    pub fn stop(&mut self) {
        let mut query = self.world.query::<&mut Continuations>();
        for mut continuations in query.iter_mut(&mut self.world) {
            continuations.clear();
        }
        self.world.resource_mut::<InputBuffer>().reset();
        self.world.resource_mut::<ToastQueue>().clear();
        self.world.resource_mut::<RoomTransition>().reset();
        self.world.resource_mut::<PendingMutations>().clear();
        self.world.resource_mut::<RunStatus>().set(RunState::Stopped);
    }

    /// Stop and return to an empty, idle runtime.
    pub fn reset(&mut self) {
        self.stop();
        despawn_all_instances(&mut self.world);
        self.world.insert_resource(GlobalVariables::default());
        self.world.insert_resource(Score::default());
        self.world.insert_resource(CurrentRoom::default());
        self.world.insert_resource(InstanceIdAllocator::default());
        self.world.insert_resource(ProgramRes::default());
        self.world.insert_resource(ProjectRes::default());
        self.world
            .insert_resource(WorldTime::default().with_time_scale(1.0));
        self.world.resource_mut::<Messages<SoundCmd>>().clear();
        self.world.resource_mut::<RunStatus>().clear();
    }

    pub fn state(&self) -> RunState {
        self.world.resource::<RunStatus>().get()
    }

    /// Fatal errors seen since construction. Survives [`reset`](Self::reset).
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.world.resource::<RuntimeConfig>()
    }

    /// Sounds requested since the last drain, in request order.
    pub fn drain_sounds(&mut self) -> Vec<SoundCmd> {
        self.world
            .resource_mut::<Messages<SoundCmd>>()
            .drain()
            .collect()
    }

    /// Editor check: would `candidate` overlap a solid-eligible placement in
    /// `room_id`? The placement with id `exclude`, if any, is ignored.
    pub fn placement_blocked(
        &self,
        project: &Project,
        room_id: &str,
        candidate: &InstancePlacement,
        exclude: Option<&str>,
    ) -> Result<bool, RuntimeError> {
        placement_blocked(
            project,
            room_id,
            candidate,
            exclude,
            self.config().default_size(),
        )
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let program = self.world.resource::<ProgramRes>().0.clone();
        let mut query = self.world.query_filtered::<(
            &InstanceId,
            &ObjectRef,
            &Placement,
            &MapPosition,
            &RigidBody,
            &Rotation,
            &BoxCollider,
            &Variables,
            Option<&Continuations>,
        ), Without<Destroyed>>();
        let mut instances: Vec<InstanceSnapshot> = query
            .iter(&self.world)
            .map(
                |(id, object, placement, position, body, rotation, collider, vars, waits)| {
                    InstanceSnapshot {
                        id: *id,
                        object_id: program.object(object.0).id.clone(),
                        placement_id: placement.label.clone(),
                        layer: placement.layer,
                        x: position.pos.x,
                        y: position.pos.y,
                        width: collider.size.x,
                        height: collider.size.y,
                        velocity_x: body.velocity.x,
                        velocity_y: body.velocity.y,
                        rotation: rotation.degrees,
                        variables: vars.to_sorted(),
                        suspended: waits.map_or(0, |w| w.pending.len()),
                    }
                },
            )
            .collect();
        instances.sort_by_key(|i| i.id);

        let time = *self.world.resource::<WorldTime>();
        let status = self.world.resource::<RunStatus>();
        Snapshot {
            state: status.get(),
            frame: time.frame_count,
            elapsed_ms: time.elapsed_ms,
            score: self.world.resource::<Score>().0,
            room: self.world.resource::<CurrentRoom>().id.clone(),
            instances,
            globals: self.world.resource::<GlobalVariables>().0.to_sorted(),
            toast: self.world.resource::<ToastQueue>().clone(),
            transition: self.world.resource::<RoomTransition>().clone(),
            ended: status.ended().map(str::to_owned),
            error_count: self.error_count,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
