//! Suspended event invocations created by the `wait` action.
//!
//! A `wait` never blocks the tick. It captures the rest of the current event
//! invocation as a [`Continuation`]: the stack of `(list, next index)`
//! [`Frame`]s still to run, the wait duration, and the time accumulated so
//! far. The interpreter accumulates tick time on it during the Step phase of
//! later ticks and resumes the frames once `elapsed_ms >= duration_ms`.
//!
//! Continuations are keyed by event slot. While a slot is suspended the
//! interpreter does not start a new invocation of that event on the same
//! instance; other slots keep running.

use bevy_ecs::prelude::{Component, Entity};
use smallvec::SmallVec;

use crate::resources::program::ListId;

/// Position inside one item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub list: ListId,
    pub next: usize,
}

pub type FrameStack = SmallVec<[Frame; 4]>;

#[derive(Debug, Clone)]
pub struct Continuation {
    /// Event slot on the instance's object.
    pub slot: usize,
    pub frames: FrameStack,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
    /// Frame number of the tick that issued the wait; time starts counting
    /// on the following tick.
    pub issued_frame: u64,
    /// Collision partner bound when the invocation started.
    pub other: Option<Entity>,
}

impl Continuation {
    pub fn is_due(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct Continuations {
    pub pending: SmallVec<[Continuation; 2]>,
}

impl Continuations {
    pub fn is_suspended(&self, slot: usize) -> bool {
        self.pending.iter().any(|c| c.slot == slot)
    }

    pub fn push(&mut self, continuation: Continuation) {
        self.pending.push(continuation);
    }

    /// Add `delta_ms` to every continuation not issued on `frame`, then
    /// remove and return the ones that are due, in slot order.
    pub fn advance(&mut self, delta_ms: f64, frame: u64) -> Vec<Continuation> {
        for c in self.pending.iter_mut() {
            if c.issued_frame != frame {
                c.elapsed_ms += delta_ms;
            }
        }
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].is_due() && self.pending[i].issued_frame != frame {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|c| c.slot);
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn cont(slot: usize, duration_ms: f64, issued_frame: u64) -> Continuation {
        Continuation {
            slot,
            frames: smallvec![Frame {
                list: ListId(0),
                next: 1
            }],
            duration_ms,
            elapsed_ms: 0.0,
            issued_frame,
            other: None,
        }
    }

    #[test]
    fn test_issuing_tick_does_not_count() {
        let mut c = Continuations::default();
        c.push(cont(0, 100.0, 5));
        assert!(c.advance(100.0, 5).is_empty());
        assert!(c.is_suspended(0));
        let due = c.advance(100.0, 6);
        assert_eq!(due.len(), 1);
        assert!(c.is_empty());
    }

    #[test]
    fn test_resumes_on_first_tick_reaching_duration() {
        let mut c = Continuations::default();
        c.push(cont(2, 500.0, 1));
        for frame in 2..6 {
            assert!(c.advance(100.0, frame).is_empty(), "frame {frame}");
        }
        let due = c.advance(100.0, 6);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].slot, 2);
        assert_eq!(due[0].elapsed_ms, 500.0);
    }

    #[test]
    fn test_due_continuations_come_back_in_slot_order() {
        let mut c = Continuations::default();
        c.push(cont(3, 10.0, 0));
        c.push(cont(1, 10.0, 0));
        c.push(cont(2, 1000.0, 0));
        let due = c.advance(20.0, 1);
        assert_eq!(due.iter().map(|d| d.slot).collect::<Vec<_>>(), vec![1, 3]);
        assert!(c.is_suspended(2));
        assert!(!c.is_suspended(1));
    }
}
