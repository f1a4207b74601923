use std::{
    fmt::Display,
    sync::{Arc, OnceLock},
};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::{Id, User, UserId};

mod catalog;
mod link;
mod manual;

pub use catalog::*;
pub use link::*;
pub use manual::*;

pub type SelectionId = Id<SelectedSong>;

#[derive(Debug, Error, PartialEq)]
pub enum SongError {
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("Not a recognized video link: {0}")]
    InvalidLink(String),

    #[error("Video is {minutes} minutes long, the limit is {limit}")]
    TooLong { minutes: u64, limit: u64 },

    #[error("Video is a stream or shorter than a minute")]
    TooShort,

    #[error("A song needs a title")]
    EmptyTitle,
}

/// Represents a song from any source that a user can pick
pub trait Selectable {
    /// The id used to tell songs apart, stringified if necessary
    fn song_id(&self) -> String;

    /// The title as it should be shown in the queue
    fn title(&self) -> String;

    /// Length of the song in seconds, if known
    fn duration(&self) -> Option<f32>;

    /// Short name of where this song comes from
    fn source(&self) -> &'static str;
}

/// Where a selected song comes from
#[derive(Debug)]
pub enum SongSource {
    Catalog(CatalogSong),
    Link(LinkSong),
    Manual(ManualSong),
}

/// The user a selection belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: UserId,
    pub name: String,
}

/// A song picked by a user. Clones share the same selection, including its sung time.
#[derive(Debug, Clone)]
pub struct SelectedSong {
    inner: Arc<Selection>,
}

#[derive(Debug)]
struct Selection {
    selection_id: SelectionId,
    owner: Owner,
    source: SongSource,
    sung_at: OnceLock<DateTime<Local>>,
}

impl Selectable for SongSource {
    fn song_id(&self) -> String {
        match self {
            SongSource::Catalog(song) => song.song_id(),
            SongSource::Link(song) => song.song_id(),
            SongSource::Manual(song) => song.song_id(),
        }
    }

    fn title(&self) -> String {
        match self {
            SongSource::Catalog(song) => song.title(),
            SongSource::Link(song) => song.title(),
            SongSource::Manual(song) => song.title(),
        }
    }

    fn duration(&self) -> Option<f32> {
        match self {
            SongSource::Catalog(song) => song.duration(),
            SongSource::Link(song) => song.duration(),
            SongSource::Manual(song) => song.duration(),
        }
    }

    fn source(&self) -> &'static str {
        match self {
            SongSource::Catalog(song) => song.source(),
            SongSource::Link(song) => song.source(),
            SongSource::Manual(song) => song.source(),
        }
    }
}

impl SelectedSong {
    pub fn new(owner: &User, source: impl Into<SongSource>) -> Self {
        Self {
            inner: Arc::new(Selection {
                selection_id: SelectionId::new(),
                owner: owner.as_owner(),
                source: source.into(),
                sung_at: OnceLock::new(),
            }),
        }
    }

    pub fn catalog(owner: &User, song: CatalogSong) -> Self {
        Self::new(owner, song)
    }

    /// Parses a raw video id or link and selects it for the owner
    pub fn link(owner: &User, id_or_link: &str) -> Result<Self, SongError> {
        Ok(Self::new(owner, LinkSong::parse(id_or_link)?))
    }

    pub fn manual(owner: &User, title: &str) -> Result<Self, SongError> {
        Ok(Self::new(owner, ManualSong::new(title)?))
    }

    /// Identity of this particular selection, unique even across equal song ids
    pub fn selection_id(&self) -> SelectionId {
        self.inner.selection_id
    }

    /// The song id, stable for the lifetime of the selection
    pub fn id(&self) -> String {
        self.inner.source.song_id()
    }

    pub fn title(&self) -> String {
        self.inner.source.title()
    }

    pub fn duration(&self) -> Option<f32> {
        self.inner.source.duration()
    }

    pub fn owner(&self) -> &Owner {
        &self.inner.owner
    }

    pub fn source(&self) -> &SongSource {
        &self.inner.source
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.inner.source, SongSource::Manual(_))
    }

    /// When the song was performed, if it was
    pub fn sung_at(&self) -> Option<DateTime<Local>> {
        self.inner.sung_at.get().copied()
    }

    pub fn was_sung(&self) -> bool {
        self.inner.sung_at.get().is_some()
    }

    /// Marks the song as sung right now. Returns false if it was already marked.
    pub fn mark_sung(&self) -> bool {
        self.inner.sung_at.set(Local::now()).is_ok()
    }

    /// Applies looked up metadata when this is a link song
    pub fn apply_link_metadata(&self, metadata: LinkMetadata) -> Result<(), SongError> {
        match &self.inner.source {
            SongSource::Link(song) => song.apply_metadata(metadata),
            _ => Ok(()),
        }
    }
}

impl PartialEq for SelectedSong {
    fn eq(&self, other: &Self) -> bool {
        self.inner.selection_id == other.inner.selection_id
    }
}

impl Eq for SelectedSong {}

impl Display for SelectedSong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.owner().name, self.title())
    }
}

impl From<CatalogSong> for SongSource {
    fn from(song: CatalogSong) -> Self {
        SongSource::Catalog(song)
    }
}

impl From<LinkSong> for SongSource {
    fn from(song: LinkSong) -> Self {
        SongSource::Link(song)
    }
}

impl From<ManualSong> for SongSource {
    fn from(song: ManualSong) -> Self {
        SongSource::Manual(song)
    }
}

#[cfg(test)]
mod test {
    use crate::{Identity, User};

    use super::{CatalogSong, SelectedSong};

    fn singer() -> User {
        User::new(Identity::Named("mary".to_string()), "mary")
    }

    #[test]
    fn clones_share_sung_time() {
        let mary = singer();
        let song = SelectedSong::catalog(&mary, CatalogSong::mock(7, "ABBA", "Waterloo"));
        let copy = song.clone();

        assert!(!copy.was_sung());
        assert!(song.mark_sung());
        assert!(copy.was_sung());
        assert_eq!(song.sung_at(), copy.sung_at());

        // Sung time is set once
        assert!(!copy.mark_sung());
    }

    #[test]
    fn equality_is_by_selection() {
        let mary = singer();
        let first = SelectedSong::catalog(&mary, CatalogSong::mock(7, "ABBA", "Waterloo"));
        let second = SelectedSong::catalog(&mary, CatalogSong::mock(7, "ABBA", "Waterloo"));

        assert_eq!(first.id(), second.id());
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn renders_owner_and_title() {
        let mary = singer();
        let song = SelectedSong::catalog(&mary, CatalogSong::mock(7, "ABBA", "Waterloo"));

        assert_eq!(song.to_string(), "mary: ABBA - Waterloo");
        assert_eq!(song.owner().id, mary.id);
    }
}
