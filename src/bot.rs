//! Bot loop: reads a channel's message stream and dispatches commands.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::commands::{SaltCommand, SaltCommands};
use crate::error::Result;
use crate::router::{BotCommand, Router};

/// Reply sent when a command fails for any reason.
pub const FAILURE_REPLY: &str = "Request failed. Check server logs for details.";

/// Dispatches messages from one channel to the salt-api commands.
pub struct Bot {
    channel: Arc<dyn Channel>,
    router: Arc<Router>,
    commands: Arc<SaltCommands>,
}

impl Bot {
    pub fn new(channel: Arc<dyn Channel>, router: Router, commands: SaltCommands) -> Self {
        Self {
            channel,
            router: Arc::new(router),
            commands: Arc::new(commands),
        }
    }

    /// Run until the channel's stream ends.
    ///
    /// Every message is handled on its own task; the loop waits for in-flight
    /// commands before returning.
    pub async fn run(&self) -> Result<()> {
        let mut stream = self.channel.start().await?;
        info!(channel = self.channel.name(), "Channel started");

        let mut tasks = JoinSet::new();
        while let Some(msg) = stream.next().await {
            let channel = Arc::clone(&self.channel);
            let router = Arc::clone(&self.router);
            let commands = Arc::clone(&self.commands);
            tasks.spawn(async move {
                handle_message(channel.as_ref(), &router, &commands, &msg).await;
            });

            // Reap finished handlers so the set does not grow unbounded.
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    warn!("Message handler panicked: {}", e);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Message handler panicked: {}", e);
            }
        }

        info!(channel = self.channel.name(), "Channel stream ended");
        self.channel.shutdown().await?;
        Ok(())
    }
}

/// Handle one message, replying with the generic failure text on error.
pub async fn handle_message(
    channel: &dyn Channel,
    router: &Router,
    commands: &SaltCommands,
    msg: &IncomingMessage,
) {
    if !router.is_command(msg) {
        debug!(user = %msg.user_id, "Ignoring non-command message");
        return;
    }
    let Some(command) = router.route_command(msg) else {
        return;
    };

    let result = match command {
        BotCommand::Salt { command, args } => {
            commands.run(command, channel, msg, &args).await
        }
        BotCommand::Help => reply(channel, msg, help_text(router.prefix())).await,
        BotCommand::Malformed { reason } => {
            reply(channel, msg, format!("Could not parse arguments: {reason}")).await
        }
        BotCommand::Unknown { command } => {
            let hint = format!(
                "Unknown command `{command}`. Try {}help.",
                router.prefix()
            );
            reply(channel, msg, hint).await
        }
    };

    if let Err(e) = result {
        warn!(channel = channel.name(), user = %msg.user_id, "Command failed: {}", e);
        if let Err(e) = channel
            .respond(msg, OutgoingResponse::text(FAILURE_REPLY))
            .await
        {
            warn!(channel = channel.name(), "Failed to send failure reply: {}", e);
        }
    }
}

async fn reply(channel: &dyn Channel, msg: &IncomingMessage, text: String) -> Result<()> {
    channel.respond(msg, OutgoingResponse::text(text)).await?;
    Ok(())
}

/// Command list shown by `help`.
pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("Available commands:");
    for cmd in SaltCommand::ALL {
        text.push_str(&format!(
            "\n{prefix}{}{} - {}",
            cmd.name(),
            cmd.usage(),
            cmd.description()
        ));
    }
    text.push_str(&format!("\n{prefix}help - show this message"));
    text
}
