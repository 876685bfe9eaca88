//! Lifecycle state of a run.
//!
//! ```text
//! Idle --start--> Running <--> Transitioning
//!                    |               |
//!                    +--endGame/error/stop--> Stopped --reset--> Idle
//! ```
//!
//! `Transitioning` is entered and left by the runtime as the room
//! transition sequencer starts and finishes. Ticks outside `Running` and
//! `Transitioning` are no-ops.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Transitioning,
    Stopped,
}

impl RunState {
    /// Whether ticks advance the simulation.
    pub fn is_live(&self) -> bool {
        matches!(self, RunState::Running | RunState::Transitioning)
    }
}

/// Authoritative run state, plus the end-of-game message once set.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatus {
    current: RunState,
    ended: Option<String>,
}

impl RunStatus {
    pub fn get(&self) -> RunState {
        self.current
    }

    pub fn set(&mut self, state: RunState) {
        self.current = state;
    }

    /// Stop the run with the `endGame` message.
    pub fn end(&mut self, message: impl Into<String>) {
        self.current = RunState::Stopped;
        self.ended = Some(message.into());
    }

    pub fn ended(&self) -> Option<&str> {
        self.ended.as_deref()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
