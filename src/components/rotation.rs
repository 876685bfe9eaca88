use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, Copy, Default)]
pub struct Rotation {
    pub degrees: f32,
}

impl Rotation {
    /// Add `delta` degrees, keeping the angle in `[0, 360)`.
    pub fn rotate_by(&mut self, delta: f32) {
        self.degrees = (self.degrees + delta).rem_euclid(360.0);
    }
}
