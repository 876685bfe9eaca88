//! ECS resources made available to the interpreter.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed while a tick runs: input state, timing, the compiled program,
//! run-wide variables and the host-facing queues. Each submodule documents
//! the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `globals` – global variables, score, current room, instance id allocator, random source
//! - `input` – held keys and single-tick press/release edges
//! - `pending` – deferred spawn/destroy, room and custom-event requests
//! - `program` – compiled object definitions and the item arena
//! - `roomtransition` – timed room transition sequencer
//! - `runstate` – lifecycle state of the run and the end-of-game message
//! - `runtimeconfig` – loop and interpreter settings loaded from INI
//! - `toast` – FIFO countdown queue of on-screen messages
//! - `worldtime` – simulation time and delta
pub mod globals;
pub mod input;
pub mod pending;
pub mod program;
pub mod roomtransition;
pub mod runstate;
pub mod runtimeconfig;
pub mod toast;
pub mod worldtime;
