use std::{io, sync::Arc, time::Duration};

use colored::{Color, Colorize};
use karayote_collab::Collab;
use log::{error, info};
use thiserror::Error;
use tokio::{
    runtime::{self, Runtime},
    signal,
    task::spawn_blocking,
};

mod config;
mod logging;

pub struct Karayote {
    collab: Arc<Collab>,
    runtime: Runtime,
}

#[derive(Debug, Error)]
pub enum KarayoteError {
    #[error("Could not read config file {path}: {source}")]
    ConfigRead { path: String, source: io::Error },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Karayote {
    fn new() -> Result<Self, KarayoteError> {
        let config = config::load_config()?;

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("karayote-async")
            .build()
            .map_err(|e| KarayoteError::Fatal(e.to_string()))?;

        info!("Connecting to the player at {}...", config.player.address);
        let collab = Arc::new(Collab::connect(config));

        Ok(Self { collab, runtime })
    }

    fn run(self) {
        let collab = self.collab.clone();

        self.runtime.block_on(async move {
            tokio::spawn(relay_events(collab));

            match signal::ctrl_c().await {
                Ok(()) => info!("Shutting down..."),
                Err(error) => error!("Could not wait for shutdown: {}", error),
            }
        });

        self.collab.player().stop();
        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }
}

/// Logs collab events until the collab goes away
async fn relay_events(collab: Arc<Collab>) {
    let events = collab.events();

    loop {
        let receiver = events.clone();

        let Ok(Ok(event)) = spawn_blocking(move || receiver.recv()).await else {
            break;
        };

        logging::log_event(&event);
    }
}

impl KarayoteError {
    fn hint(&self) -> String {
        match self {
            KarayoteError::ConfigRead { .. } => "Make sure KARAYOTE_CONFIG points to a readable file, or unset it to use the defaults.".to_string(),
            KarayoteError::Config(_) => "The config file must be RON with optional `session` and `player` sections.".to_string(),
            KarayoteError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

fn main() {
    if let Err(error) = logging::init_logger() {
        eprintln!("Could not set up logging: {}", error);
    }

    match Karayote::new() {
        Ok(karayote) => {
            info!("Initialized successfully.");
            karayote.run();
        }
        Err(error) => {
            error!("{} Read the error below to troubleshoot the issue. If you think this might be a bug, please report it by making a GitHub issue.", "Karayote failed to start!".bold().color(Color::Red));
            error!("{}", error);
            error!(
                "{}",
                format!("Hint: {}", error.hint())
                    .color(Color::BrightBlack)
                    .italic()
            );
        }
    }
}
