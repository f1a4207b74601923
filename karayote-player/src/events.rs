use std::sync::Arc;

use crate::PlayerStatus;

/// Describes the events emitted by the player client.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The player's status differs from the last known one.
    StatusChanged(Arc<PlayerStatus>),
}
