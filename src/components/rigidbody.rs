//! Kinematic body storing an instance's velocity.
//!
//! Set by the `setVelocity` action and integrated into
//! [`MapPosition`](super::mapposition::MapPosition) by the movement system
//! after the Step phase.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Velocity in room units per second.
    pub velocity: Vec2,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(velocity: Vec2) -> Self {
        Self { velocity }
    }
}
