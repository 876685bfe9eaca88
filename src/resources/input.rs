//! Keyboard state with single-tick edge tracking.
//!
//! The host feeds raw down/up events into the [`InputBuffer`] resource as
//! they arrive. `pressed` holds the keys currently down; `just_pressed` and
//! `just_released` hold the edges seen since the last
//! [`clear_edges`](InputBuffer::clear_edges), which the tick calls once after
//! events have consumed them.
//!
//! Key identifiers are opaque strings (`"ArrowLeft"`, `"Space"`, ...); every
//! operation is total over arbitrary keys.
use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;

use crate::project::KeyState;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    pressed: FxHashSet<String>,
    just_pressed: FxHashSet<String>,
    just_released: FxHashSet<String>,
}

impl InputBuffer {
    /// Record a key press. Repeated downs of a held key do not re-trigger
    /// the edge.
    pub fn key_down(&mut self, key: &str) {
        if !self.pressed.contains(key) {
            self.just_pressed.insert(key.to_owned());
            self.pressed.insert(key.to_owned());
        }
    }

    /// Record a key release. Releasing a key that is not held is a no-op.
    pub fn key_up(&mut self, key: &str) {
        if self.pressed.remove(key) {
            self.just_released.insert(key.to_owned());
        }
    }

    /// Release every held key, e.g. when the host loses focus.
    pub fn release_all(&mut self) {
        self.just_released.extend(self.pressed.drain());
    }

    /// Drop this tick's edges. Held keys stay held.
    pub fn clear_edges(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Forget everything. Only used at run start/stop.
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.clear_edges();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    pub fn is_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }

    pub fn is_just_released(&self, key: &str) -> bool {
        self.just_released.contains(key)
    }

    /// Read `key` in the given state, as an input operand does.
    pub fn query(&self, key: &str, state: KeyState) -> bool {
        match state {
            KeyState::Held => self.is_held(key),
            KeyState::Pressed => self.is_just_pressed(key),
            KeyState::Released => self.is_just_released(key),
        }
    }

    pub fn pressed(&self) -> &FxHashSet<String> {
        &self.pressed
    }

    pub fn just_pressed(&self) -> &FxHashSet<String> {
        &self.just_pressed
    }

    pub fn just_released(&self) -> &FxHashSet<String> {
        &self.just_released
    }
}
