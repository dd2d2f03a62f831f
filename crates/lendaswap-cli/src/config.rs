//! CLI settings

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use lendaswap::Network;
use serde::{Deserialize, Serialize};

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.lendaswap.com";

/// Prefix of environment overrides, `LENDASWAP_API_URL` sets `api_url`
const ENV_PREFIX: &str = "LENDASWAP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub network: Network,
    pub referral_code: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            network: Network::Bitcoin,
            referral_code: None,
        }
    }
}

impl Settings {
    /// Defaults, overridden by `config_file` if it exists, overridden by the environment
    pub fn new(config_file: &Path) -> Result<Self, ConfigError> {
        let default_settings = Self::default();

        let config = Config::builder()
            .add_source(Config::try_from(&default_settings)?)
            .add_source(File::from(config_file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        tracing::debug!("Loaded settings {:?}", settings);

        Ok(settings)
    }
}
