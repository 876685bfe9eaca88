//! Room transition sequencer.
//!
//! Drives the timed animation between rooms. While a transition runs the
//! interpreter suspends Step and Collision dispatch; when it finishes the
//! pending destination room is handed back for the swap.
//!
//! ```text
//! none --start(kind, room)--> kind (220ms) --advance..--> none + swap(room)
//! ```
//!
//! At most one transition runs at a time; a second `start` is rejected.

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use serde::Serialize;

use crate::project::TransitionKind;

/// Runtime duration of every transition kind.
pub const TRANSITION_MS: f64 = 220.0;

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTransition {
    kind: TransitionKind,
    remaining_ms: f64,
    #[serde(skip)]
    pending_room: Option<String>,
}

impl RoomTransition {
    /// Start a transition toward `room`. Returns `false` (and changes
    /// nothing) if one is already running or `kind` is `None`.
    pub fn start(&mut self, kind: TransitionKind, room: impl Into<String>) -> bool {
        if kind == TransitionKind::None {
            return false;
        }
        if self.in_progress() {
            warn!(
                "Room transition {:?} rejected: {:?} already in progress",
                kind, self.kind
            );
            return false;
        }
        let room = room.into();
        debug!("Room transition {:?} toward {:?} started", kind, room);
        self.kind = kind;
        self.remaining_ms = TRANSITION_MS;
        self.pending_room = Some(room);
        true
    }

    /// Advance by `elapsed_ms`. Returns the destination room when the
    /// transition completes on this call.
    pub fn advance(&mut self, elapsed_ms: f64) -> Option<String> {
        if !self.in_progress() {
            return None;
        }
        self.remaining_ms -= elapsed_ms.max(0.0);
        if self.remaining_ms > 0.0 {
            return None;
        }
        debug!("Room transition {:?} finished", self.kind);
        self.kind = TransitionKind::None;
        self.remaining_ms = 0.0;
        self.pending_room.take()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn in_progress(&self) -> bool {
        self.kind != TransitionKind::None
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn pending_room(&self) -> Option<&str> {
        self.pending_room.as_deref()
    }
}
