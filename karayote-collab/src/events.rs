use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use karayote_core::{Owner, Session};
use karayote_player::{PlayerEvent, PlayerStatus};

pub type EventSender = Sender<CollabEvent>;
pub type EventReceiver = Receiver<CollabEvent>;

/// Events for whoever relays the event to the people in the room
#[derive(Debug, Clone)]
pub enum CollabEvent {
    /// The player's status changed
    StatusUpdate {
        /// The rendered song queue
        queue: String,
        player: Arc<PlayerStatus>,
    },
    /// Songs were added, removed or moved
    QueueUpdate { queue: String },
    /// A singer should get ready, or come up now
    SingerNotice { singer: Owner, message: String },
    /// A song was performed
    JustSang { singer: Owner, title: String },
    /// A host changed one of this user's songs
    OwnerNotice { owner: Owner, message: String },
    /// Something everyone should hear about
    Announcement(String),
}

impl CollabEvent {
    /// Convert a player event to a friendly collab event
    pub fn from_player_event(session: &Session, event: PlayerEvent) -> CollabEvent {
        match event {
            PlayerEvent::StatusChanged(player) => Self::StatusUpdate {
                queue: session.queue().to_string(),
                player,
            },
        }
    }
}
