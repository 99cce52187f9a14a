//! Configuration for saltbot.
//!
//! Values are resolved with priority: env var > TOML settings file. A `.env`
//! in the working directory is loaded via dotenvy before resolution; dotenvy
//! never overwrites variables that are already set.

mod channels;
pub(crate) mod helpers;
mod salt;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::Settings;

pub use self::channels::{ChannelsConfig, TelegramConfig};
pub use self::salt::SaltApiConfig;

/// Main configuration for the bot.
#[derive(Debug, Clone)]
pub struct Config {
    pub salt_api: SaltApiConfig,
    pub channels: ChannelsConfig,
}

impl Config {
    /// Load `.env`, overlay the TOML file, then resolve from the environment.
    ///
    /// `explicit_path` (or `SALTBOT_CONFIG`) must point at an existing file;
    /// the default `~/.saltbot/config.toml` is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let explicit = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => helpers::optional_env("SALTBOT_CONFIG")?.map(PathBuf::from),
        };
        let settings = Self::load_settings(explicit.as_deref())?;

        Self::resolve(&settings)
    }

    /// Resolve every section from env vars with `settings` as fallback.
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            salt_api: SaltApiConfig::resolve(settings)?,
            channels: ChannelsConfig::resolve(settings)?,
        })
    }

    fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Settings::default_toml_path);

        match Settings::load_toml(&path) {
            Ok(Some(settings)) => {
                tracing::debug!("Loaded TOML config from {}", path.display());
                Ok(settings)
            }
            Ok(None) => {
                if explicit_path.is_some() {
                    return Err(ConfigError::ParseError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Ok(Settings::default())
            }
            Err(e) => {
                if explicit_path.is_some() {
                    return Err(ConfigError::ParseError(format!(
                        "Failed to load config file {}: {}",
                        path.display(),
                        e
                    )));
                }
                tracing::warn!("Failed to load default config file: {}", e);
                Ok(Settings::default())
            }
        }
    }
}
