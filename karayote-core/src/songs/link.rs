use std::sync::OnceLock;

use lazy_static::lazy_static;
use regex::Regex;

use super::{Selectable, SongError};

lazy_static! {
    static ref VIDEO_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
    static ref LINK_REGEX: Regex = Regex::new(
        r"(?i)(?:watch\?v=|/videos/|embed/|youtu\.be/|/v/|watch\?v%3D|%2Fvideos%2F|embed%2F|youtu\.be%2F|%2Fv%2F)([^#&?\n]*)"
    )
    .unwrap();
}

/// Looked up details of a linked video
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMetadata {
    pub title: String,
    pub duration_in_seconds: u64,
}

/// A karaoke video hosted elsewhere, identified by its 11 character video id
#[derive(Debug, Clone)]
pub struct LinkSong {
    video_id: String,
    metadata: OnceLock<LinkMetadata>,
}

impl LinkSong {
    pub const MAX_MINUTES: u64 = 10;
    pub const MIN_SECONDS: u64 = 60;

    /// Accepts either a bare video id or a link containing one
    pub fn parse(input: &str) -> Result<Self, SongError> {
        let input = input.trim();

        if VIDEO_ID_REGEX.is_match(input) {
            return Ok(Self::with_id(input));
        }

        let id = LINK_REGEX
            .captures(input)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| SongError::InvalidLink(input.to_string()))?;

        if !VIDEO_ID_REGEX.is_match(id) {
            return Err(SongError::InvalidVideoId(id.to_string()));
        }

        Ok(Self::with_id(id))
    }

    fn with_id(id: &str) -> Self {
        Self {
            video_id: id.to_string(),
            metadata: OnceLock::new(),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn url(&self) -> String {
        format!("https://youtu.be/{}", self.video_id)
    }

    pub fn metadata(&self) -> Option<&LinkMetadata> {
        self.metadata.get()
    }

    /// Validates and stores looked up metadata. Metadata is only stored once.
    pub fn apply_metadata(&self, metadata: LinkMetadata) -> Result<(), SongError> {
        if metadata.duration_in_seconds > Self::MAX_MINUTES * 60 {
            return Err(SongError::TooLong {
                minutes: metadata.duration_in_seconds / 60,
                limit: Self::MAX_MINUTES,
            });
        }

        if metadata.duration_in_seconds < Self::MIN_SECONDS {
            return Err(SongError::TooShort);
        }

        let _ = self.metadata.set(metadata);
        Ok(())
    }
}

impl Selectable for LinkSong {
    fn song_id(&self) -> String {
        self.video_id.clone()
    }

    fn title(&self) -> String {
        match self.metadata.get() {
            Some(metadata) => metadata.title.clone(),
            None => format!("YouTube video with ID {}", self.video_id),
        }
    }

    fn duration(&self) -> Option<f32> {
        self.metadata
            .get()
            .map(|m| m.duration_in_seconds as f32)
    }

    fn source(&self) -> &'static str {
        "youtube"
    }
}
