mod config;
mod error;
mod events;
mod input;
mod replies;

use std::{sync::Arc, thread};

use crossbeam::channel::{unbounded, Receiver};
use dashmap::DashMap;
use karayote_core::{
    AdmitResult, CatalogSong, SelectedSong, Session, SessionConfig, SessionPhase, User,
    UserRegistry,
};
use karayote_player::{CatalogEntry, Command, KaraokePlayer, PlayerClient, PlayerEvent};
use log::{debug, info};

pub use config::*;
pub use error::*;
pub use events::*;
pub use input::*;

/// What happened when a host tried to open the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    Reopened,
    AlreadyOpen,
    /// The player must be reachable before anyone can pick songs
    PlayerUnavailable,
    SessionOver,
}

/// Everything a user has picked this session
#[derive(Debug, Clone, PartialEq)]
pub struct UserSelections {
    /// The queued song and its 1-based position
    pub current: Option<(SelectedSong, usize)>,
    pub reserve: Vec<SelectedSong>,
    /// Songs already sung
    pub history: Vec<SelectedSong>,
}

/// The karaoke event: a session, the people in it and the player it drives.
pub struct Collab<P = PlayerClient> {
    session: Arc<Session>,
    users: Arc<UserRegistry>,
    player: Arc<P>,

    event_sender: EventSender,
    event_receiver: EventReceiver,

    /// Catalog songs seen in searches, so they can be picked by id later
    found_songs: DashMap<u32, CatalogEntry>,
}

impl Collab<PlayerClient> {
    /// Starts talking to the player described by the config
    pub fn connect(config: CollabConfig) -> Self {
        Self::new(config.session, PlayerClient::new(config.player))
    }
}

impl<P> Collab<P>
where
    P: KaraokePlayer,
{
    pub fn new(config: SessionConfig, player: P) -> Self {
        let users = Arc::new(UserRegistry::new());
        let session = Arc::new(Session::new(config, users.clone()));
        let player = Arc::new(player);
        let (event_sender, event_receiver) = unbounded();

        spawn_forwarding_thread(session.clone(), player.events(), event_sender.clone());

        Self {
            session,
            users,
            player,
            event_sender,
            event_receiver,
            found_songs: Default::default(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn users(&self) -> &Arc<UserRegistry> {
        &self.users
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Receive events from the collab system.
    pub fn events(&self) -> Receiver<CollabEvent> {
        self.event_receiver.clone()
    }

    pub fn admit(&self, song: SelectedSong) -> AdmitResult {
        let result = self.session.admit(song);

        if result == AdmitResult::SuccessInQueue {
            self.queue_changed();
        }

        result
    }

    pub fn remove_song(&self, user: &User, position: usize) -> bool {
        let removed = self.session.remove_song(user, position);

        if removed && position == 1 {
            self.queue_changed();
        }

        removed
    }

    pub fn switch_user_songs(&self, user: &User, first: usize, second: usize) -> bool {
        let switched = self.session.switch_user_songs(user, first, second);

        if switched && first.min(second) == 1 {
            self.queue_changed();
        }

        switched
    }

    /// Moves on to the next singer and returns the song that was on stage
    pub fn advance_queue(&self, sung: bool) -> Option<SelectedSong> {
        let song = self.session.next_song(sung)?;

        if sung {
            self.emit(CollabEvent::JustSang {
                singer: song.owner().clone(),
                title: song.title(),
            });
        }

        info!("Done with {}", song);

        self.queue_changed();
        self.send_singer_notices();

        Some(song)
    }

    pub fn user_selections(&self, user: &User) -> UserSelections {
        UserSelections {
            current: self.session.queue().find_by_user(user.id),
            reserve: user.reserved_songs(),
            history: self.session.user_history(user.id).unwrap_or_default(),
        }
    }

    /// Opens the session for picking songs, or reopens a closed queue
    pub fn open_session(&self) -> OpenOutcome {
        let reopening = match self.session.phase() {
            SessionPhase::Over => return OpenOutcome::SessionOver,
            SessionPhase::Open => return OpenOutcome::AlreadyOpen,
            // Closed because the queue would run past the end
            SessionPhase::TemporarilyClosed if !self.session.is_closed() => {
                return OpenOutcome::AlreadyOpen
            }
            SessionPhase::TemporarilyClosed => true,
            SessionPhase::NotYetOpen => false,
        };

        if !self.player_is_available() {
            return OpenOutcome::PlayerUnavailable;
        }

        if reopening {
            self.session.reopen();
            self.queue_changed();

            return OpenOutcome::Reopened;
        }

        self.session.open();
        self.emit(CollabEvent::Announcement(
            "The session is now open for searching and queueing! DM me to make your selections and get in line."
                .to_string(),
        ));
        self.queue_changed();

        OpenOutcome::Opened
    }

    /// Starts the performances. Returns false if they already started or the session is over.
    pub fn start_session(&self) -> bool {
        if self.session.is_started() || self.session.is_over() {
            return false;
        }

        self.session.start();
        self.emit(CollabEvent::Announcement(
            "And the singing starts.... NOW!".to_string(),
        ));
        self.send_singer_notices();

        true
    }

    pub fn close_session(&self) {
        self.session.close();
    }

    pub fn end_session(&self) {
        self.session.end();
        self.emit(CollabEvent::Announcement(
            "Karayote is done for the night. Thanks for coming!".to_string(),
        ));
    }

    /// Moves a song in the queue, by 0-based indices
    pub fn move_song(&self, old_index: usize, new_index: usize) {
        self.session.queue().move_song(old_index, new_index);
        self.queue_changed();
    }

    /// Takes a user's song out of the queue on a host's request and lets the user know
    pub fn remove_queued_song(&self, user: &User) -> bool {
        let Some((song, old_position)) = self.session.queue().find_by_user(user.id) else {
            return false;
        };

        if !self.remove_song(user, 1) {
            return false;
        }

        let mut message = format!("The host has removed {} from the queue. ", song.title());

        match self.session.queue().find_by_user(user.id) {
            Some((replacement, position)) => message.push_str(&format!(
                "It's been replaced by your song in reserve: {}, still at number {} in line",
                replacement.title(),
                position
            )),
            None => message.push_str(&format!(
                "Please see them for more info. (You were at position {} in line)",
                old_position
            )),
        }

        self.emit(CollabEvent::OwnerNotice {
            owner: user.as_owner(),
            message,
        });

        true
    }

    /// Searches the player's catalog and remembers the results
    pub fn search_catalog(&self, terms: &str) -> Result<Vec<CatalogEntry>, CollabError> {
        let entries = self
            .player
            .search(terms, Command::DEFAULT_SEARCH_LIMIT, 0)?;

        for entry in &entries {
            self.found_songs.insert(entry.id, entry.clone());
        }

        debug!("Found {} songs for {:?}", entries.len(), terms);
        Ok(entries)
    }

    /// A song from an earlier search
    pub fn catalog_song(&self, entry_id: u32) -> Result<CatalogSong, CollabError> {
        let entry = self
            .found_songs
            .get(&entry_id)
            .ok_or(CollabError::UnknownCatalogSong(entry_id))?;

        // Unknown lengths are estimated by the session
        let duration = (entry.duration > 0.).then_some(entry.duration);

        Ok(CatalogSong::new(entry.id, &entry.artist, &entry.title, duration))
    }

    fn player_is_available(&self) -> bool {
        self.player.current_status().is_some() || self.player.status().is_ok()
    }

    fn emit(&self, event: CollabEvent) {
        let _ = self.event_sender.send(event);
    }

    /// Asks the player for a fresh status and shares the new queue
    fn queue_changed(&self) {
        self.player.send(Command::status());
        self.emit(CollabEvent::QueueUpdate {
            queue: self.session.queue().to_string(),
        });
    }

    fn send_singer_notices(&self) {
        let queue = self.session.queue();

        let Some(now_playing) = queue.now_playing() else {
            return;
        };

        self.emit(CollabEvent::SingerNotice {
            singer: now_playing.owner().clone(),
            message: format!(
                "It's now your turn to sing {}! Come on up to the stage!",
                now_playing.title()
            ),
        });

        if let Some(next_up) = queue.next_up() {
            self.emit(CollabEvent::SingerNotice {
                singer: next_up.owner().clone(),
                message: format!(
                    "You'll be up next to sing {} after {} sings {}. Don't go too far!",
                    next_up.title(),
                    now_playing.owner().name,
                    now_playing.title()
                ),
            });
        }
    }
}

/// Republishes player events with the current queue attached
fn spawn_forwarding_thread(
    session: Arc<Session>,
    player_events: Receiver<PlayerEvent>,
    event_sender: EventSender,
) {
    let run = move || {
        for event in player_events.iter() {
            let event = CollabEvent::from_player_event(&session, event);

            if event_sender.send(event).is_err() {
                break;
            }
        }
    };

    thread::spawn(run);
}
