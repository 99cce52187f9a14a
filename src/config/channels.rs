use secrecy::SecretString;

use crate::config::helpers::{optional_env, parsed_env};
use crate::error::ConfigError;
use crate::settings::Settings;

const DEFAULT_COMMAND_PREFIX: &str = "!";
const DEFAULT_TELEGRAM_POLL_TIMEOUT_SECS: u64 = 30;

/// Channel configurations.
#[derive(Debug, Clone)]
pub struct ChannelsConfig {
    /// Prefix that marks a chat message as a bot command.
    pub command_prefix: String,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Telegram owner user ID. When set, the bot only responds to this user.
    pub owner_id: Option<i64>,
    pub poll_timeout_secs: u64,
}

impl ChannelsConfig {
    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let channels = &settings.channels;

        let command_prefix = optional_env("BOT_COMMAND_PREFIX")?
            .or_else(|| channels.command_prefix.clone())
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());
        if command_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "BOT_COMMAND_PREFIX".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let telegram = match optional_env("TELEGRAM_BOT_TOKEN")?
            .or_else(|| channels.telegram_bot_token.clone())
        {
            Some(token) => {
                let poll_timeout_secs = parsed_env(
                    "TELEGRAM_POLL_TIMEOUT_SECS",
                    channels.telegram_poll_timeout_secs,
                )?
                .unwrap_or(DEFAULT_TELEGRAM_POLL_TIMEOUT_SECS);
                if poll_timeout_secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "TELEGRAM_POLL_TIMEOUT_SECS".to_string(),
                        message: "must be > 0".to_string(),
                    });
                }

                Some(TelegramConfig {
                    bot_token: SecretString::from(token.trim().to_string()),
                    owner_id: parsed_env("TELEGRAM_OWNER_ID", channels.telegram_owner_id)?,
                    poll_timeout_secs,
                })
            }
            None => None,
        };

        Ok(Self {
            command_prefix,
            telegram,
        })
    }
}
