//! Fixed-timestep driver.
//!
//! Hosts measure wall-clock frames; the runtime wants fixed ticks.
//! [`FixedTimestep`] accumulates frame time and hands out `tick_ms` steps;
//! [`GameLoop`] runs those steps against a [`Runtime`] and forwards each
//! resulting [`Snapshot`] and sound to a [`FrameSink`].
//!
//! A single frame is clamped to `max_frame_ms` and runs at most
//! `max_ticks_per_frame` ticks. Backlog beyond that is dropped.

use log::{debug, warn};

use crate::error::RuntimeError;
use crate::events::sound::SoundCmd;
use crate::runtime::{Runtime, Snapshot};

/// Receives the output of every tick.
pub trait FrameSink {
    fn draw(&mut self, snapshot: &Snapshot);

    fn play(&mut self, _sound: &SoundCmd) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    accumulator_ms: f64,
    tick_ms: f64,
}

impl FixedTimestep {
    pub fn new(tick_ms: f64) -> Self {
        Self {
            accumulator_ms: 0.0,
            tick_ms,
        }
    }

    /// Add a frame's worth of time, clamped to `max_frame_ms`.
    pub fn feed(&mut self, frame_ms: f64, max_frame_ms: f64) {
        let frame = if frame_ms.is_finite() {
            frame_ms.clamp(0.0, max_frame_ms)
        } else {
            0.0
        };
        if frame < frame_ms {
            debug!("Frame of {}ms clamped to {}ms", frame_ms, frame);
        }
        self.accumulator_ms += frame;
    }

    pub fn pop_step(&mut self) -> Option<f64> {
        if self.accumulator_ms >= self.tick_ms {
            self.accumulator_ms -= self.tick_ms;
            Some(self.tick_ms)
        } else {
            None
        }
    }

    /// Forget accumulated time. Returns what was dropped.
    pub fn drop_backlog(&mut self) -> f64 {
        std::mem::take(&mut self.accumulator_ms)
    }

    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }
}

pub struct GameLoop {
    runtime: Runtime,
    timestep: FixedTimestep,
    max_frame_ms: f64,
    max_ticks_per_frame: u32,
}

impl GameLoop {
    pub fn new(runtime: Runtime) -> Self {
        let config = runtime.config();
        let timestep = FixedTimestep::new(config.tick_ms);
        let max_frame_ms = config.max_frame_ms;
        let max_ticks_per_frame = config.max_ticks_per_frame;
        Self {
            runtime,
            timestep,
            max_frame_ms,
            max_ticks_per_frame,
        }
    }

    /// Run the ticks a frame of `frame_ms` pays for. Returns how many ran.
    pub fn frame(
        &mut self,
        frame_ms: f64,
        sink: &mut impl FrameSink,
    ) -> Result<u32, RuntimeError> {
        if !self.runtime.state().is_live() {
            self.timestep.drop_backlog();
            return Ok(0);
        }
        self.timestep.feed(frame_ms, self.max_frame_ms);
        let mut ticks = 0;
        while ticks < self.max_ticks_per_frame && self.runtime.state().is_live() {
            let Some(step) = self.timestep.pop_step() else {
                break;
            };
            self.runtime.tick(step)?;
            ticks += 1;
            for sound in self.runtime.drain_sounds() {
                sink.play(&sound);
            }
            sink.draw(&self.runtime.snapshot());
        }
        if ticks == self.max_ticks_per_frame && self.timestep.pop_step().is_some() {
            let dropped = self.timestep.drop_backlog() + self.timestep.tick_ms;
            warn!("Dropped {:.1}ms of backlog after {} ticks", dropped, ticks);
        }
        Ok(ticks)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn into_runtime(self) -> Runtime {
        self.runtime
    }
}
