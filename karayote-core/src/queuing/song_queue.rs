use std::fmt::Display;

use parking_lot::Mutex;

use crate::{SelectedSong, UserId};

/// The performance order of the event. Position 0 is being performed, position 1 is on deck.
///
/// The queue itself does not enforce one entry per user, the session does.
#[derive(Debug, Default)]
pub struct SongQueue {
    items: Mutex<Vec<SelectedSong>>,
}

impl SongQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, song: SelectedSong) {
        self.items.lock().push(song);
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.items.lock().iter().any(|s| s.owner().id == user_id)
    }

    pub fn has_song(&self, song_id: &str) -> bool {
        self.items.lock().iter().any(|s| s.id() == song_id)
    }

    /// The user's queued song and its 1-based position
    pub fn find_by_user(&self, user_id: UserId) -> Option<(SelectedSong, usize)> {
        self.items
            .lock()
            .iter()
            .enumerate()
            .find(|(_, s)| s.owner().id == user_id)
            .map(|(index, song)| (song.clone(), index + 1))
    }

    pub fn remove_by_user(&self, user_id: UserId) -> Option<SelectedSong> {
        let mut items = self.items.lock();
        let index = items.iter().position(|s| s.owner().id == user_id)?;

        Some(items.remove(index))
    }

    /// Swaps in a new song for the user's queued one, keeping its position
    pub fn replace_by_user(&self, user_id: UserId, song: SelectedSong) -> Option<SelectedSong> {
        let mut items = self.items.lock();
        let slot = items.iter_mut().find(|s| s.owner().id == user_id)?;

        Some(std::mem::replace(slot, song))
    }

    /// Moves a song to another position. Both indices are clamped to the queue.
    pub fn move_song(&self, old_index: usize, new_index: usize) {
        let mut items = self.items.lock();

        if items.is_empty() {
            return;
        }

        let last = items.len() - 1;
        let song = items.remove(old_index.min(last));
        items.insert(new_index.min(last), song);
    }

    pub fn pop_front(&self) -> Option<SelectedSong> {
        let mut items = self.items.lock();

        if items.is_empty() {
            return None;
        }

        Some(items.remove(0))
    }

    /// Inserts a song at the head of the queue
    pub fn push_front(&self, song: SelectedSong) {
        self.items.lock().insert(0, song);
    }

    pub fn now_playing(&self) -> Option<SelectedSong> {
        self.items.lock().first().cloned()
    }

    pub fn next_up(&self) -> Option<SelectedSong> {
        self.items.lock().get(1).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// A snapshot of the queue
    pub fn items(&self) -> Vec<SelectedSong> {
        self.items.lock().clone()
    }

    /// Sum of the known song durations, using `fallback` for songs without a usable one
    pub fn estimated_seconds(&self, fallback: f32) -> f32 {
        self.items
            .lock()
            .iter()
            .map(|s| {
                s.duration()
                    .filter(|d| d.is_finite() && *d > 0.)
                    .unwrap_or(fallback)
            })
            .sum()
    }
}

impl Display for SongQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self.items.lock();

        write!(f, "SONG QUEUE\n----------\n")?;

        if items.is_empty() {
            return write!(f, "Empty");
        }

        for (index, song) in items.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }

            match index {
                0 => write!(f, "Now] {}", song)?,
                1 => write!(f, "Next] {}", song)?,
                n => write!(f, "{}] {}", n + 1, song)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{CatalogSong, Identity, SelectedSong, User};

    use super::SongQueue;

    fn user(name: &str) -> User {
        User::new(Identity::Named(name.to_string()), name)
    }

    fn pick(user: &User, id: u32, title: &str) -> SelectedSong {
        SelectedSong::catalog(user, CatalogSong::mock(id, "Band", title))
    }

    #[test]
    fn finds_by_user_with_positions() {
        let queue = SongQueue::new();
        let (ann, bob) = (user("ann"), user("bob"));

        queue.add(pick(&ann, 1, "One"));
        queue.add(pick(&bob, 2, "Two"));

        let (song, position) = queue.find_by_user(bob.id).unwrap();
        assert_eq!(song.id(), "2");
        assert_eq!(position, 2);

        assert!(queue.has_user(ann.id));
        assert!(queue.has_song("1"));
        assert!(!queue.has_song("3"));
    }

    #[test]
    fn replace_keeps_position() {
        let queue = SongQueue::new();
        let (ann, bob) = (user("ann"), user("bob"));
        let replacement = pick(&ann, 3, "Three");

        queue.add(pick(&ann, 1, "One"));
        queue.add(pick(&bob, 2, "Two"));

        let old = queue.replace_by_user(ann.id, replacement.clone()).unwrap();

        assert_eq!(old.id(), "1");
        assert_eq!(queue.now_playing(), Some(replacement));
        assert_eq!(queue.next_up().map(|s| s.id()), Some("2".to_string()));
        assert_eq!(queue.replace_by_user(user("cy").id, old), None);
    }

    #[test]
    fn move_clamps_indices() {
        let queue = SongQueue::new();
        let (ann, bob, cy) = (user("ann"), user("bob"), user("cy"));

        queue.move_song(0, 5);

        queue.add(pick(&ann, 1, "One"));
        queue.add(pick(&bob, 2, "Two"));
        queue.add(pick(&cy, 3, "Three"));

        queue.move_song(10, 0);
        let ids: Vec<_> = queue.items().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);

        queue.move_song(0, 99);
        let ids: Vec<_> = queue.items().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn pops_from_the_front() {
        let queue = SongQueue::new();
        let ann = user("ann");

        assert_eq!(queue.pop_front(), None);

        queue.add(pick(&ann, 1, "One"));
        assert_eq!(queue.pop_front().map(|s| s.id()), Some("1".to_string()));
        assert!(queue.is_empty());
        assert_eq!(queue.remove_by_user(ann.id), None);
    }

    #[test]
    fn renders_queue() {
        let queue = SongQueue::new();
        assert_eq!(queue.to_string(), "SONG QUEUE\n----------\nEmpty");

        let (ann, bob, cy) = (user("ann"), user("bob"), user("cy"));
        queue.add(pick(&ann, 1, "One"));
        queue.add(pick(&bob, 2, "Two"));
        queue.add(pick(&cy, 3, "Three"));

        assert_eq!(
            queue.to_string(),
            "SONG QUEUE\n----------\nNow] ann: Band - One\nNext] bob: Band - Two\n3] cy: Band - Three"
        );
    }
}
