//! Run-wide mutable state owned by the interpreter: global variables, the
//! score, the current room, the instance id allocator and the random
//! source.

use bevy_ecs::prelude::Resource;
use glam::Vec2;

use crate::components::instance::InstanceId;
use crate::components::variables::Variables;

/// Global variable bindings, seeded from the project's declarations.
#[derive(Resource, Debug, Clone, Default)]
pub struct GlobalVariables(pub Variables);

/// Score changed by the `changeScore` action.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Score(pub f64);

/// Hands out instance ids in creation order. Never reuses an id within a run.
#[derive(Resource, Debug, Clone, Default)]
pub struct InstanceIdAllocator {
    next: u32,
}

impl InstanceIdAllocator {
    pub fn allocate(&mut self) -> InstanceId {
        self.next += 1;
        InstanceId(self.next)
    }
}

/// The room whose instances are live, with its bounds for `clampToRoom`.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct CurrentRoom {
    pub id: Option<String>,
    pub size: Vec2,
}

/// Random source for `randomizeVariable`.
#[derive(Resource, Debug)]
pub struct RandomSource(pub fastrand::Rng);

impl RandomSource {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(fastrand::Rng::with_seed(seed)),
            None => Self(fastrand::Rng::new()),
        }
    }

    /// Uniform value in `[min, max]`; integer mode rounds the bounds inward.
    /// When no integer lies in the range the lower bound is returned as is.
    pub fn range(&mut self, min: f64, max: f64, integer: bool) -> f64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if integer {
            let first = lo.ceil() as i64;
            let last = hi.floor() as i64;
            if first > last {
                return lo;
            }
            self.0.i64(first..=last) as f64
        } else {
            lo + self.0.f64() * (hi - lo)
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(None)
    }
}
