//! End-of-game notification.
//!
//! The `endGame` action stops the run and triggers a [`GameEndedEvent`]
//! carrying its message. Hosts can register their own observers; the
//! runtime always registers [`log_game_ended`].
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct GameEndedEvent {
    pub message: String,
}

/// Global observer that logs the end message.
pub fn log_game_ended(trigger: On<GameEndedEvent>) {
    info!("Game ended: {}", trigger.event().message);
}
