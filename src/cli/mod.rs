//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ChannelsConfig;

#[derive(Parser, Debug)]
#[command(name = "saltbot", version, about = "Relay chat commands to salt-api")]
pub struct Cli {
    /// TOML config file (defaults to ~/.saltbot/config.toml when present)
    #[arg(long, env = "SALTBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chat transport to listen on
    #[arg(long, value_enum)]
    pub channel: Option<ChannelKind>,

    /// Send a single message through the REPL and exit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Repl,
    Telegram,
}

impl Cli {
    /// Explicit `--channel` wins; `-m` forces the REPL; otherwise Telegram
    /// when a bot token is configured.
    pub fn channel_kind(&self, channels: &ChannelsConfig) -> ChannelKind {
        match (self.channel, &self.message) {
            (Some(kind), _) => kind,
            (None, Some(_)) => ChannelKind::Repl,
            (None, None) if channels.telegram.is_some() => ChannelKind::Telegram,
            (None, None) => ChannelKind::Repl,
        }
    }
}
