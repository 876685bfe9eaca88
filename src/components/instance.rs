//! Identity and lifecycle markers of a runtime instance.
//!
//! Every live instance is an entity carrying an [`InstanceId`] (unique and
//! never reused within a run), an [`ObjectRef`] back to its compiled object,
//! and its [`Placement`] label. [`PendingCreate`] marks instances whose
//! Create event has not run yet; [`Destroyed`] marks instances removed by an
//! action this tick, awaiting the deferred commit.

use bevy_ecs::prelude::Component;
use serde::Serialize;

use crate::resources::program::ObjectIndex;

/// Runtime id of an instance. Evaluation order is ascending id.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InstanceId(pub u32);

/// Back-reference to the instance's object definition.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef(pub ObjectIndex);

/// Authoring-time placement data carried for the renderer.
#[derive(Component, Debug, Clone, Default)]
pub struct Placement {
    /// Placement id from the room document; `None` for spawned instances.
    pub label: Option<String>,
    pub layer: Option<i32>,
}

/// The instance has not received its Create event yet.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingCreate;

/// The instance was destroyed by an action and is removed at commit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Destroyed;
