use parking_lot::Mutex;

use crate::{Id, Owner, SelectedSong};

pub type UserId = Id<User>;

/// How a user is known to the outside world
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// An account on a messaging service, keyed by its remote id
    Remote(String),
    /// A name typed in by a host for someone without an account
    Named(String),
}

/// A participant of the event, holding a bounded list of reserved songs
#[derive(Debug)]
pub struct User {
    pub id: UserId,
    name: String,
    identity: Identity,
    /// Songs held back while the user occupies a queue slot, in priority order
    reserved: Mutex<Vec<SelectedSong>>,
}

impl User {
    pub const MAX_RESERVED_SONGS: usize = 2;

    pub fn new(identity: Identity, name: &str) -> Self {
        Self {
            id: UserId::new(),
            name: name.to_string(),
            identity,
            reserved: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn as_owner(&self) -> Owner {
        Owner {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Adds a song to the back of the reserve. Returns false when full.
    pub fn add_reserved_song(&self, song: SelectedSong) -> bool {
        let mut reserved = self.reserved.lock();

        if reserved.len() >= Self::MAX_RESERVED_SONGS {
            return false;
        }

        reserved.push(song);
        true
    }

    /// A copy of the reserve
    pub fn reserved_songs(&self) -> Vec<SelectedSong> {
        self.reserved.lock().clone()
    }

    pub fn reserved_song(&self, index: usize) -> Option<SelectedSong> {
        self.reserved.lock().get(index).cloned()
    }

    pub fn remove_reserved_song(&self, index: usize) -> Option<SelectedSong> {
        let mut reserved = self.reserved.lock();

        if index >= reserved.len() {
            return None;
        }

        Some(reserved.remove(index))
    }

    /// Puts a song in place of the one at `index`, returning the old one
    pub fn replace_reserved_song(&self, index: usize, song: SelectedSong) -> Option<SelectedSong> {
        let mut reserved = self.reserved.lock();
        let slot = reserved.get_mut(index)?;

        Some(std::mem::replace(slot, song))
    }

    pub fn switch_reserved_songs(&self, first: usize, second: usize) -> bool {
        let mut reserved = self.reserved.lock();

        if first >= reserved.len() || second >= reserved.len() {
            return false;
        }

        reserved.swap(first, second);
        true
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.lock().len()
    }
}
