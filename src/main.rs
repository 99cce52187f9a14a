use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use saltbot::bot::Bot;
use saltbot::channels::{Channel, ReplChannel, TelegramChannel};
use saltbot::cli::{ChannelKind, Cli};
use saltbot::commands::SaltCommands;
use saltbot::config::Config;
use saltbot::router::Router;
use saltbot::salt::{HttpConnector, SessionHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::load(cli.config.as_deref())?;
    let prefix = config.channels.command_prefix.clone();

    let channel: Arc<dyn Channel> = match cli.channel_kind(&config.channels) {
        ChannelKind::Repl => match cli.message.clone() {
            Some(message) => Arc::new(ReplChannel::with_message(prefix.clone(), message)),
            None => Arc::new(ReplChannel::new(prefix.clone())),
        },
        ChannelKind::Telegram => {
            let telegram = config.channels.telegram.clone().ok_or_else(|| {
                anyhow::anyhow!("--channel telegram requires TELEGRAM_BOT_TOKEN")
            })?;
            Arc::new(TelegramChannel::new(telegram)?)
        }
    };

    if let Err(e) = channel.health_check().await {
        tracing::warn!(channel = channel.name(), "Channel health check failed: {}", e);
    }

    tracing::info!(
        channel = channel.name(),
        salt_api = %config.salt_api.url,
        "saltbot starting"
    );

    let session = SessionHandle::new(config.salt_api, Arc::new(HttpConnector::new()));
    let bot = Bot::new(
        channel,
        Router::new().with_prefix(prefix),
        SaltCommands::new(session),
    );
    bot.run().await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("saltbot=info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so REPL replies on stdout stay clean.
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
