//! Error types for saltbot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Salt API error: {0}")]
    SaltApi(#[from] SaltApiError),

    #[error("Template error: {0}")]
    Render(#[from] askama::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Errors raised while talking to salt-api.
///
/// `Connection` deliberately carries no cause: whatever went wrong during
/// login (DNS, refused connection, bad credentials, malformed URL) is logged
/// where it happens and the caller only learns that no session exists.
#[derive(Debug, thiserror::Error)]
pub enum SaltApiError {
    #[error("Could not establish connection with Salt API")]
    Connection,

    #[error("Arguments validation failed: expected {expected} arguments, got {got}")]
    Argument { expected: usize, got: usize },

    #[error("Response validation failed: {reason}")]
    Response { reason: String },

    #[error("Salt API request failed: {reason}")]
    Request { reason: String },
}

impl SaltApiError {
    pub(crate) fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }

    pub(crate) fn request(reason: impl Into<String>) -> Self {
        Self::Request {
            reason: reason.into(),
        }
    }
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
