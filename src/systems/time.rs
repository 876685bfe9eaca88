//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance the clock by one tick.
///
/// `dt_ms` is the unscaled tick delta in milliseconds. The system applies the
/// current `time_scale`, writes `elapsed_ms` and `delta_ms`, and numbers the
/// tick in `frame_count`.
pub fn update_world_time(world: &mut World, dt_ms: f64) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt_ms * wt.time_scale;
    wt.elapsed_ms += scaled_dt;
    wt.delta_ms = scaled_dt;
    wt.frame_count += 1;
}
