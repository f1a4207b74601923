use serde::Deserialize;

/// Where a reserved song goes when it is promoted into the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Promotion {
    /// Into the slot the user's previous song just left
    HeadOfQueue,
    /// Behind everyone already waiting
    BackOfQueue,
}

/// Rules of a karaoke session
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether a song can only be picked once per session
    pub no_repeats: bool,
    /// Where promoted reserve songs are placed
    pub promotion: Promotion,
    /// Assumed length of songs with an unknown duration, used to tell if the queue
    /// would run past the scheduled end
    pub estimated_song_seconds: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            no_repeats: true,
            promotion: Promotion::HeadOfQueue,
            // Most karaoke tracks are around 4 minutes
            estimated_song_seconds: 240.,
        }
    }
}
