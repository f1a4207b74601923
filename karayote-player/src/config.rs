use std::time::Duration;

use serde::Deserialize;

/// How to reach the karaoke player and how often to poll it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Websocket address of the player
    pub address: String,
    /// How long to wait for the player to accept a connection
    pub connect_timeout_in_seconds: f32,
    /// How long to wait for any single message from the player
    pub read_timeout_in_seconds: f32,
    /// How often to refresh the status when nothing else is happening
    pub idle_refresh_in_seconds: f32,
    /// Refresh the status at least this often, even when busy
    pub force_refresh_in_seconds: f32,
    /// How long the worker waits for commands between iterations
    pub tick_in_seconds: f32,
    /// Upper bound of the polling interval while the player is unreachable
    pub max_backoff_in_seconds: f32,
    /// Whether to read and discard the message the player sends on connect
    pub drain_on_connect: bool,
}

impl PlayerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.connect_timeout_in_seconds)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.read_timeout_in_seconds)
    }

    pub fn idle_refresh(&self) -> Duration {
        Duration::from_secs_f32(self.idle_refresh_in_seconds)
    }

    pub fn force_refresh(&self) -> Duration {
        Duration::from_secs_f32(self.force_refresh_in_seconds)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs_f32(self.tick_in_seconds)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs_f32(self.max_backoff_in_seconds)
    }

    /// The idle refresh interval after a number of consecutive failures
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = 2f32.powi(failures.min(16) as i32);
        let seconds = (self.idle_refresh_in_seconds * factor).min(self.max_backoff_in_seconds);

        Duration::from_secs_f32(seconds.max(self.idle_refresh_in_seconds))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            // Default address when the player runs on the same machine
            address: "ws://localhost:57570".to_string(),
            connect_timeout_in_seconds: 3.,
            read_timeout_in_seconds: 5.,
            idle_refresh_in_seconds: 3.,
            force_refresh_in_seconds: 12.,
            // Fast enough to feel instant, slow enough not to hammer the player
            tick_in_seconds: 0.05,
            max_backoff_in_seconds: 60.,
            drain_on_connect: true,
        }
    }
}
