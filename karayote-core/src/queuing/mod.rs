mod song_queue;

pub use song_queue::*;
