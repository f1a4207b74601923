use karayote_core::SongError;
use karayote_player::PlayerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollabError {
    #[error(transparent)]
    Song(#[from] SongError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error("Song {0} was not in any recent search")]
    UnknownCatalogSong(u32),
}
