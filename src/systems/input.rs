//! Input systems.
//!
//! Key events reach [`InputBuffer`] from the host between ticks. The only
//! per-tick work is dropping the edges once every event has seen them.
use bevy_ecs::prelude::*;

use crate::resources::input::InputBuffer;

/// Clear `just_pressed`/`just_released` at the end of the tick.
pub fn clear_input_edges(mut input: ResMut<InputBuffer>) {
    input.clear_edges();
}
