//! Runtime systems.
//!
//! This module groups the functions that advance one tick of a run.
//!
//! Submodules overview
//! - [`actions`] – execute a single action against the world
//! - [`collision`] – collision pairs, the Collision phase, placement checks
//! - [`input`] – clear input edges at the end of the tick
//! - [`interpreter`] – event dispatch, conditions, waits, and the Create/Step/custom phases
//! - [`lifecycle`] – spawn and despawn instances, commit deferred effects, swap rooms
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`time`] – update simulation time and delta
//! - [`toast`] – count down the toast queue

pub mod actions;
pub mod collision;
pub mod input;
pub mod interpreter;
pub mod lifecycle;
pub mod movement;
pub mod time;
pub mod toast;
