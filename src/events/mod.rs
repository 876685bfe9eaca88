//! Event types and observers used by the runtime.
//!
//! Submodules:
//! - [`gameended`] – terminal notification raised by the `endGame` action
//! - [`sound`] – sound playback commands drained by the host
pub mod gameended;
pub mod sound;
