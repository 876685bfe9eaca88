//! Playforge runtime library.
//!
//! Runs games authored as event/action documents: objects declare events
//! (Create, Step, Collision, custom), each holding an ordered list of
//! actions and if-blocks; rooms place instances of objects. This crate
//! interprets those documents tick by tick on a bevy_ecs world.
//!
//! - [`project`] – the serde document model
//! - [`runtime`] – the host-facing [`Runtime`](runtime::Runtime) and its snapshots
//! - [`gameloop`] – fixed-timestep driver
//! - [`components`], [`resources`], [`systems`], [`events`] – the ECS side

pub mod components;
pub mod error;
pub mod events;
pub mod gameloop;
pub mod project;
pub mod resources;
pub mod runtime;
pub mod systems;
