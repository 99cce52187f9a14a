//! Message routing to bot commands.
//!
//! The router recognises the command prefix and splits the remainder into
//! arguments with shell-style quoting, so `!glob "web*" "uptime -p"` yields
//! two arguments.

use crate::channels::IncomingMessage;
use crate::commands::SaltCommand;

/// Command extracted from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// One of the salt-api commands with its split arguments.
    Salt {
        command: SaltCommand,
        args: Vec<String>,
    },
    /// List the available commands.
    Help,
    /// Arguments could not be split (e.g. an unterminated quote).
    Malformed { reason: String },
    /// Prefixed word that names no command.
    Unknown { command: String },
}

/// Routes messages to commands based on the configured prefix.
pub struct Router {
    /// Command prefix (e.g., "!" or "/")
    command_prefix: String,
}

impl Router {
    /// Create a new router with the default `!` prefix.
    pub fn new() -> Self {
        Self {
            command_prefix: "!".to_string(),
        }
    }

    /// Set the command prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Check if a message is an explicit command: the prefix directly
    /// followed by a command name.
    pub fn is_command(&self, message: &IncomingMessage) -> bool {
        self.command_body(&message.content).is_some()
    }

    /// Route a message to a command.
    ///
    /// Returns `None` for anything [`Router::is_command`] rejects; plain
    /// chatter and a bare prefix are ignored.
    pub fn route_command(&self, message: &IncomingMessage) -> Option<BotCommand> {
        self.command_body(&message.content)
            .map(|body| self.parse_command(body))
    }

    fn command_body<'a>(&self, content: &'a str) -> Option<&'a str> {
        let body = content.trim().strip_prefix(&self.command_prefix)?;
        if body.is_empty() || body.starts_with(char::is_whitespace) {
            return None;
        }
        Some(body)
    }

    fn parse_command(&self, content: &str) -> BotCommand {
        let (head, rest) = match content.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest),
            None => (content, ""),
        };

        // Telegram appends the bot username in groups: `!minions@salt_bot`.
        let name = head
            .split_once('@')
            .map_or(head, |(name, _)| name)
            .to_lowercase();

        if name == "help" {
            return BotCommand::Help;
        }

        let Some(command) = SaltCommand::from_name(&name) else {
            return BotCommand::Unknown { command: name };
        };

        match shell_words::split(rest) {
            Ok(args) => BotCommand::Salt { command, args },
            Err(e) => BotCommand::Malformed {
                reason: e.to_string(),
            },
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(router: &Router, content: &str) -> Option<BotCommand> {
        router.route_command(&IncomingMessage::new("test", "user", content))
    }

    #[test]
    fn test_is_command() {
        let router = Router::new();

        let cmd_msg = IncomingMessage::new("test", "user", "!minions");
        assert!(router.is_command(&cmd_msg));

        let chat_msg = IncomingMessage::new("test", "user", "Hello there");
        assert!(!router.is_command(&chat_msg));
    }

    #[test]
    fn test_bare_prefix_is_not_a_command() {
        let router = Router::new();
        for content in ["!", "  !  ", "! minions"] {
            let msg = IncomingMessage::new("test", "user", content);
            assert!(!router.is_command(&msg), "{content:?}");
            assert!(router.route_command(&msg).is_none(), "{content:?}");
        }
    }

    #[test]
    fn test_non_command_returns_none() {
        let router = Router::new();
        assert!(route(&router, "what minions do we have?").is_none());
        assert!(route(&router, "/minions").is_none());
    }

    #[test]
    fn test_minions_takes_no_arguments() {
        let router = Router::new();
        assert_eq!(
            route(&router, "  !minions  "),
            Some(BotCommand::Salt {
                command: SaltCommand::Minions,
                args: vec![],
            })
        );
    }

    #[test]
    fn test_quoted_arguments_are_split_shell_style() {
        let router = Router::new();
        assert_eq!(
            route(&router, r#"!glob "docker01.*" "ls -la /root""#),
            Some(BotCommand::Salt {
                command: SaltCommand::Glob,
                args: vec!["docker01.*".to_string(), "ls -la /root".to_string()],
            })
        );
        assert_eq!(
            route(&router, "!grain virtual_subtype:Docker ls"),
            Some(BotCommand::Salt {
                command: SaltCommand::Grain,
                args: vec!["virtual_subtype:Docker".to_string(), "ls".to_string()],
            })
        );
    }

    #[test]
    fn test_unquoted_command_yields_extra_arguments() {
        let router = Router::new();
        match route(&router, "!glob web* ls -la") {
            Some(BotCommand::Salt { args, .. }) => assert_eq!(args.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let router = Router::new();
        assert!(matches!(
            route(&router, r#"!glob "web* ls"#),
            Some(BotCommand::Malformed { .. })
        ));
    }

    #[test]
    fn test_bot_username_suffix_and_case() {
        let router = Router::new();
        assert_eq!(
            route(&router, "!Minions@salt_bot"),
            Some(BotCommand::Salt {
                command: SaltCommand::Minions,
                args: vec![],
            })
        );
        assert_eq!(route(&router, "!help@salt_bot"), Some(BotCommand::Help));
    }

    #[test]
    fn test_unknown_command() {
        let router = Router::new();
        assert_eq!(
            route(&router, "!reboot now"),
            Some(BotCommand::Unknown {
                command: "reboot".to_string()
            })
        );
    }

    #[test]
    fn test_custom_prefix() {
        let router = Router::new().with_prefix("/");
        assert_eq!(router.prefix(), "/");
        assert_eq!(route(&router, "/help"), Some(BotCommand::Help));
        assert!(route(&router, "!help").is_none());
    }
}
