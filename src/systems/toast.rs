//! Toast countdown.
use bevy_ecs::prelude::*;

use crate::resources::toast::ToastQueue;
use crate::resources::worldtime::WorldTime;

/// Spend the tick's delta on the toast queue.
pub fn advance_toasts(world_time: Res<WorldTime>, mut toasts: ResMut<ToastQueue>) {
    toasts.advance(world_time.delta_ms);
}
