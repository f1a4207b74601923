use log::{debug, warn};

use crate::{Promotion, SelectedSong, User};

use super::Session;

/// The outcome of a song request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitResult {
    SuccessInQueue,
    SuccessInReserve,
    UserReserveFull,
    AlreadySelected,
    QueueClosed,
    UnknownFailure,
}

impl AdmitResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SuccessInQueue | Self::SuccessInReserve)
    }
}

impl Session {
    /// Puts a requested song in the queue, or in its owner's reserve if they
    /// already have a song queued. Nothing changes unless the result is a success.
    pub fn admit(&self, song: SelectedSong) -> AdmitResult {
        let mut history = self.history.lock();

        if !self.is_open() {
            return AdmitResult::QueueClosed;
        }

        let song_id = song.id();

        if self.config.no_repeats && history.iter().any(|s| s.id() == song_id) {
            return AdmitResult::AlreadySelected;
        }

        let Some(user) = self.users.get(song.owner().id) else {
            warn!("Song {} belongs to an unknown user", song);
            return AdmitResult::UnknownFailure;
        };

        if self.queue.has_user(user.id) {
            if !user.add_reserved_song(song.clone()) {
                return AdmitResult::UserReserveFull;
            }

            debug!("Reserved {}", song);
            history.push(song);

            return AdmitResult::SuccessInReserve;
        }

        debug!("Queued {}", song);
        self.queue.add(song.clone());

        if !song.is_manual() {
            history.push(song);
        }

        AdmitResult::SuccessInQueue
    }

    /// Removes one of a user's songs. Position 1 is their queued song, 2 and up
    /// are their reserve. A queued song is replaced by the first reserved song if
    /// there is one, so the user keeps their place.
    pub fn remove_song(&self, user: &User, position: usize) -> bool {
        let mut history = self.history.lock();

        let removed = match position {
            1 => match user.reserved_song(0) {
                None => self.queue.remove_by_user(user.id),
                Some(first) => {
                    let old = self.queue.replace_by_user(user.id, first);

                    if old.is_some() {
                        user.remove_reserved_song(0);
                    }

                    old
                }
            },
            p if p > 1 && p - 1 <= User::MAX_RESERVED_SONGS => user.remove_reserved_song(p - 2),
            _ => None,
        };

        let Some(removed) = removed else {
            return false;
        };

        // Unsung songs can be picked again
        if !removed.was_sung() {
            history.retain(|s| *s != removed);
        }

        debug!("Removed {}", removed);
        true
    }

    /// Swaps two of a user's songs, by the same positions as [Session::remove_song].
    /// Either both songs move or nothing does.
    pub fn switch_user_songs(&self, user: &User, first: usize, second: usize) -> bool {
        let earlier = first.min(second);
        let later = first.max(second);

        if earlier == 0 || earlier == later {
            return false;
        }

        let _guard = self.history.lock();

        if earlier > 1 {
            return user.switch_reserved_songs(earlier - 2, later - 2);
        }

        let reserve_index = later - 2;

        let Some(from_reserve) = user.reserved_song(reserve_index) else {
            return false;
        };

        let Some(from_queue) = self.queue.replace_by_user(user.id, from_reserve) else {
            return false;
        };

        // Session methods hold the history lock, so this only fails when the
        // reserve was edited directly on the `User` in the meantime
        if user
            .replace_reserved_song(reserve_index, from_queue.clone())
            .is_none()
        {
            warn!("Could not put {} back in the reserve, reverting", from_queue);
            self.queue.replace_by_user(user.id, from_queue);

            return false;
        }

        true
    }

    /// Moves on from the song at the head of the queue and returns it.
    ///
    /// A sung song stays in the history for good, a skipped one can be picked again.
    /// The departing user's first reserved song is then promoted into the queue.
    pub fn next_song(&self, sung: bool) -> Option<SelectedSong> {
        let mut history = self.history.lock();
        let song = self.queue.pop_front()?;

        if sung {
            song.mark_sung();
        } else {
            history.retain(|s| *s != song);
        }

        let promoted = self
            .users
            .get(song.owner().id)
            .and_then(|user| user.remove_reserved_song(0));

        if let Some(promoted) = promoted {
            debug!("Promoted {}", promoted);

            match self.config.promotion {
                Promotion::HeadOfQueue => self.queue.push_front(promoted),
                Promotion::BackOfQueue => self.queue.add(promoted),
            }
        }

        Some(song)
    }
}
