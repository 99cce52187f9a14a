//! File-backed settings.
//!
//! Settings come from an optional TOML file (default
//! `~/.saltbot/config.toml`). Every value is optional here; the resolvers in
//! `crate::config` apply env-var overrides and enforce what is required.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Root of the TOML settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub salt_api: SaltApiSettings,
    pub channels: ChannelSettings,
}

/// `[salt_api]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaltApiSettings {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub eauth: Option<String>,
}

/// `[channels]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub command_prefix: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_owner_id: Option<i64>,
    pub telegram_poll_timeout_secs: Option<u64>,
}

impl Settings {
    /// Default settings file location: `~/.saltbot/config.toml`.
    pub fn default_toml_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".saltbot")
            .join("config.toml")
    }

    /// Load settings from a TOML file.
    ///
    /// Returns `None` if the file doesn't exist. Returns an error only
    /// if the file exists but can't be read or parsed.
    pub fn load_toml(path: &Path) -> Result<Option<Self>, String> {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("failed to read {}: {}", path.display(), e)),
        };

        let settings: Self = toml::from_str(&data)
            .map_err(|e| format!("invalid TOML in {}: {}", path.display(), e))?;
        Ok(Some(settings))
    }
}
