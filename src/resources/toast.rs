//! FIFO queue of short-lived on-screen messages.
//!
//! At most one toast is active. New toasts become active immediately when
//! nothing is showing, otherwise they wait in `queued`. Advancing time
//! cascades: leftover time from an expired toast is spent on the next one,
//! so one large step can expire several toasts.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use log::debug;
use serde::Serialize;

/// Durations are floored to this so every toast eventually expires.
pub const MIN_TOAST_MS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub text: String,
    pub remaining_ms: f64,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastQueue {
    active: Option<Toast>,
    queued: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn enqueue(&mut self, text: impl Into<String>, duration_ms: f64) {
        let duration = if duration_ms.is_finite() {
            duration_ms.max(MIN_TOAST_MS)
        } else {
            MIN_TOAST_MS
        };
        let toast = Toast {
            text: text.into(),
            remaining_ms: duration,
        };
        if self.active.is_none() {
            debug!("Toast shown: {:?}", toast.text);
            self.active = Some(toast);
        } else {
            self.queued.push_back(toast);
        }
    }

    /// Spend `elapsed_ms` on the active toast, carrying leftover time into
    /// the queued ones.
    pub fn advance(&mut self, elapsed_ms: f64) {
        let mut budget = elapsed_ms.max(0.0);
        while let Some(active) = self.active.as_mut() {
            if budget < active.remaining_ms {
                active.remaining_ms -= budget;
                return;
            }
            budget -= active.remaining_ms;
            self.active = self.queued.pop_front();
            if let Some(next) = &self.active {
                debug!("Toast shown: {:?}", next.text);
            }
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.queued.clear();
    }

    pub fn active(&self) -> Option<&Toast> {
        self.active.as_ref()
    }

    pub fn queued(&self) -> &VecDeque<Toast> {
        &self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.queued.is_empty()
    }
}
