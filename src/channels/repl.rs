//! Interactive REPL channel with line editing.
//!
//! Lets an operator drive the bot from a terminal without a chat service.
//! Uses rustyline for line editing, history, and tab-completion of the bot
//! commands.
//!
//! ## Local commands
//!
//! - `/quit` or `/exit` - Exit the REPL
//! - Ctrl+D - Exit the REPL

use std::borrow::Cow;

use async_trait::async_trait;
use rustyline::completion::Completer;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Editor, Helper};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::commands::SaltCommand;
use crate::error::ChannelError;

const CHANNEL_NAME: &str = "repl";
const REPL_USER: &str = "operator";

/// Rustyline helper for bot-command tab completion.
struct ReplHelper {
    commands: Vec<String>,
}

impl ReplHelper {
    fn new(prefix: &str) -> Self {
        let commands = SaltCommand::ALL
            .iter()
            .map(|cmd| cmd.name())
            .chain(std::iter::once("help"))
            .map(|name| format!("{prefix}{name}"))
            .collect();
        Self { commands }
    }
}

impl Completer for ReplHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let prefix = &line[..pos];
        if prefix.contains(' ') {
            return Ok((0, vec![]));
        }

        let matches = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .cloned()
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if line.is_empty() || pos < line.len() {
            return None;
        }

        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.as_str() != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for ReplHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{hint}\x1b[0m"))
    }
}

impl Validator for ReplHelper {}
impl Helper for ReplHelper {}

/// REPL channel reading commands from the terminal.
pub struct ReplChannel {
    /// Command prefix, used for completion.
    prefix: String,
    /// Optional single message to send (for -m flag).
    single_message: Option<String>,
}

impl ReplChannel {
    /// Create a new REPL channel.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            single_message: None,
        }
    }

    /// Create a REPL channel that sends a single message and exits.
    pub fn with_message(prefix: impl Into<String>, message: String) -> Self {
        Self {
            prefix: prefix.into(),
            single_message: Some(message),
        }
    }
}

#[async_trait]
impl Channel for ReplChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = mpsc::channel(32);

        if let Some(msg) = self.single_message.clone() {
            let incoming = IncomingMessage::new(CHANNEL_NAME, REPL_USER, msg);
            tx.send(incoming)
                .await
                .map_err(|e| ChannelError::StartupFailed {
                    name: CHANNEL_NAME.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Box::pin(ReceiverStream::new(rx)));
        }

        let prefix = self.prefix.clone();
        std::thread::spawn(move || {
            let config = Config::builder()
                .auto_add_history(true)
                .completion_type(CompletionType::List)
                .build();

            let mut rl = match Editor::with_config(config) {
                Ok(editor) => editor,
                Err(e) => {
                    eprintln!("Failed to initialize line editor: {e}");
                    return;
                }
            };

            rl.set_helper(Some(ReplHelper::new(&prefix)));

            let hist_path = history_path();
            if let Some(parent) = hist_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(&hist_path);

            println!("\x1b[1msaltbot\x1b[0m  {prefix}help for commands, /quit to exit");
            println!();

            loop {
                match rl.readline("\x1b[1;36m\u{203A}\x1b[0m ") {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if matches!(line, "/quit" | "/exit") {
                            break;
                        }

                        let msg = IncomingMessage::new(CHANNEL_NAME, REPL_USER, line);
                        if tx.blocking_send(msg).is_err() {
                            break;
                        }
                    }
                    Err(ReadlineError::Interrupted) => continue,
                    Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        eprintln!("Input error: {e}");
                        break;
                    }
                }
            }

            let _ = rl.save_history(&history_path());
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        eprintln!("\x1b[90m{}\x1b[0m", "\u{2500}".repeat(60));
        println!("{}", response.content);
        println!();
        Ok(())
    }
}

fn history_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".saltbot")
        .join("history")
}
