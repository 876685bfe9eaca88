//! ECS components for runtime instances.
//!
//! Each live instance of an object definition is an entity carrying these
//! components. The interpreter reads and mutates them while dispatching
//! events.
//!
//! Submodules overview:
//! - [`boxcollider`] – axis-aligned collider and the shared overlap predicates
//! - [`continuation`] – suspended event invocations created by `wait`
//! - [`instance`] – instance id, object back-reference, lifecycle markers
//! - [`mapposition`] – room-space position of an instance
//! - [`rigidbody`] – simple kinematic body storing velocity
//! - [`rotation`] – rotation angle in degrees
//! - [`variables`] – typed per-instance variable bindings and coercion rules

pub mod boxcollider;
pub mod continuation;
pub mod instance;
pub mod mapposition;
pub mod rigidbody;
pub mod rotation;
pub mod variables;
