use bevy_ecs::prelude::Resource;

/// Simulation clock, in milliseconds.
///
/// `delta_ms` is the elapsed time of the tick in progress; `frame_count`
/// numbers ticks from 1 within a run.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    pub elapsed_ms: f64,
    pub delta_ms: f64,
    pub time_scale: f64,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn delta_seconds(&self) -> f32 {
        (self.delta_ms / 1000.0) as f32
    }
}
