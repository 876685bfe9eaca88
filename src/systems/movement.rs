//! Velocity integration.
//!
//! Velocities are in room units per second; the tick delta is scaled by
//! [`WorldTime::time_scale`] before it reaches this system.
use bevy_ecs::prelude::*;

use crate::components::instance::Destroyed;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::resources::worldtime::WorldTime;

/// Move every live instance by `velocity * delta`.
pub fn movement_system(
    mut query: Query<(&mut MapPosition, &RigidBody), Without<Destroyed>>,
    time: Res<WorldTime>,
) {
    let dt = time.delta_seconds();
    for (mut position, rigidbody) in query.iter_mut() {
        if rigidbody.velocity != glam::Vec2::ZERO {
            position.pos += rigidbody.velocity * dt;
        }
    }
}
