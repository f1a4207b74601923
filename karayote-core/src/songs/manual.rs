use crate::random_id;

use super::{Selectable, SongError};

/// A song typed in by a host, not tied to the catalog or a video
#[derive(Debug, Clone, PartialEq)]
pub struct ManualSong {
    id: String,
    title: String,
}

impl ManualSong {
    const ID_LENGTH: usize = 16;

    pub fn new(title: &str) -> Result<Self, SongError> {
        let title = title.trim();

        if title.is_empty() {
            return Err(SongError::EmptyTitle);
        }

        Ok(Self {
            id: random_id(Self::ID_LENGTH),
            title: title.to_string(),
        })
    }
}

impl Selectable for ManualSong {
    fn song_id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn duration(&self) -> Option<f32> {
        None
    }

    fn source(&self) -> &'static str {
        "manual"
    }
}
