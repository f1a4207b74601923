use karayote_core::SessionConfig;
use karayote_player::PlayerConfig;
use serde::Deserialize;

/// Everything needed to run an event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollabConfig {
    pub session: SessionConfig,
    pub player: PlayerConfig,
}
