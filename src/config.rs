use std::{env, fs};

use karayote_collab::CollabConfig;
use log::info;

use crate::KarayoteError;

/// Names a RON file with the config
const CONFIG_VARIABLE: &str = "KARAYOTE_CONFIG";
const PLAYER_ADDRESS_VARIABLE: &str = "KARAYOTE_PLAYER_ADDRESS";

pub fn load_config() -> Result<CollabConfig, KarayoteError> {
    let mut config = match env::var(CONFIG_VARIABLE) {
        Ok(path) => {
            info!("Reading config from {}", path);

            let data = fs::read_to_string(&path)
                .map_err(|source| KarayoteError::ConfigRead { path, source })?;

            parse_config(&data)?
        }
        Err(_) => CollabConfig::default(),
    };

    if let Ok(address) = env::var(PLAYER_ADDRESS_VARIABLE) {
        config.player.address = address;
    }

    Ok(config)
}

fn parse_config(data: &str) -> Result<CollabConfig, KarayoteError> {
    ron::from_str(data).map_err(|e| KarayoteError::Config(e.to_string()))
}
