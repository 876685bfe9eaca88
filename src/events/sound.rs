use bevy_ecs::message::Message;
use serde::Serialize;

/// Sound playback requested by the `playSound` action.
///
/// Written to `Messages<SoundCmd>` during a tick; the host drains them and
/// hands them to its audio backend.
#[derive(Message, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundCmd {
    pub sound_id: String,
}
