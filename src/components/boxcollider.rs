//! Axis-aligned box collider and the overlap predicates built on it.
//!
//! [`overlaps`] and [`would_overlap_solid`] are shared by the runtime
//! Collision phase and by editor-time placement validation, so both agree on
//! what counts as a blocking overlap.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::components::instance::InstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct BoxCollider {
    pub size: Vec2,
    pub offset: Vec2,
    /// Copied from the object definition's `solid` flag.
    pub solid: bool,
}

impl BoxCollider {
    /// Create a non-solid BoxCollider with given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
            solid: false,
        }
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Returns (min, max) of the collider AABB for a given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec2) -> (Vec2, Vec2) {
        let p0 = position + self.offset;
        let p1 = p0 + self.size;
        (p0.min(p1), p0.max(p1))
    }

    /// AABB vs AABB overlap test against another BoxCollider at a different entity position.
    /// Touching edges do not overlap.
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        let (min_a, max_a) = self.aabb(position);
        let (min_b, max_b) = other.aabb(other_position);
        min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
    }
}

/// A collider placed in the room, detached from the ECS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBody {
    pub id: InstanceId,
    pub position: Vec2,
    pub collider: BoxCollider,
}

/// True iff the boxes of `a` and `b` intersect with positive area.
pub fn overlaps(a: &CollisionBody, b: &CollisionBody) -> bool {
    a.collider.overlaps(a.position, &b.collider, b.position)
}

/// True iff either side of the pair is solid.
pub fn solid_eligible(a: &CollisionBody, b: &CollisionBody) -> bool {
    a.collider.solid || b.collider.solid
}

/// True iff `candidate` overlaps any body in `others` (other than
/// `exclude`, and other than itself) where at least one side is solid.
pub fn would_overlap_solid(
    candidate: &CollisionBody,
    others: &[CollisionBody],
    exclude: Option<InstanceId>,
) -> bool {
    others
        .iter()
        .filter(|other| other.id != candidate.id && Some(other.id) != exclude)
        .any(|other| solid_eligible(candidate, other) && overlaps(candidate, other))
}
