use std::sync::Arc;

use crossbeam::channel::Receiver;

use crate::{Catalog, CatalogEntry, Command, PlayerError, PlayerEvent, PlayerStatus};

/// What the rest of the system needs from a karaoke player
pub trait KaraokePlayer: Send + Sync + 'static {
    /// Runs a command and waits for the raw answer
    fn execute(&self, command: Command) -> Result<String, PlayerError>;

    /// Runs a command without waiting for it
    fn send(&self, command: Command);

    /// The latest known status, if any
    fn current_status(&self) -> Option<Arc<PlayerStatus>>;

    /// Status changes, in the order they were seen
    fn events(&self) -> Receiver<PlayerEvent>;

    fn stop(&self);

    /// Fetches the status right now
    fn status(&self) -> Result<Arc<PlayerStatus>, PlayerError> {
        let response = self.execute(Command::status())?;
        Ok(Arc::new(PlayerStatus::parse(&response)?))
    }

    /// Searches the player's catalogs
    fn search(&self, terms: &str, limit: u32, offset: u32) -> Result<Vec<CatalogEntry>, PlayerError> {
        let response = self.execute(Command::Search {
            terms: terms.to_string(),
            limit,
            offset,
        })?;

        CatalogEntry::parse_list(&response)
    }

    /// Lists the songs of a catalog
    fn list(&self, list_id: u32, limit: u32, offset: u32) -> Result<Vec<CatalogEntry>, PlayerError> {
        let response = self.execute(Command::GetList {
            list_id,
            limit,
            offset,
        })?;

        CatalogEntry::parse_list(&response)
    }

    fn catalogs(&self) -> Result<Vec<Catalog>, PlayerError> {
        let response = self.execute(Command::GetCatalogList)?;
        Catalog::parse_list(&response)
    }
}
