//! Request builders for the three salt-api calls the bot makes.

use serde_json::Value;

use super::{SessionHandle, TargetKind};
use crate::error::SaltApiError;

/// Validated `[selector, command]` pair for run requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    target: String,
    command: String,
}

impl CommandArgs {
    pub const EXPECTED_LEN: usize = 2;

    /// Accept exactly two tokens: the target selector and the shell command.
    pub fn from_args(args: &[String]) -> Result<Self, SaltApiError> {
        match args {
            [target, command] => Ok(Self {
                target: target.clone(),
                command: command.clone(),
            }),
            _ => Err(SaltApiError::Argument {
                expected: Self::EXPECTED_LEN,
                got: args.len(),
            }),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// A salt-api call whose arguments have already been validated.
///
/// Construction is where argument checks happen, so a request that exists can
/// be sent without further validation and a rejected one never touches the
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltRequest {
    ListMinions,
    Run { kind: TargetKind, args: CommandArgs },
}

impl SaltRequest {
    pub fn list_minions() -> Self {
        Self::ListMinions
    }

    pub fn run(kind: TargetKind, args: &[String]) -> Result<Self, SaltApiError> {
        Ok(Self::Run {
            kind,
            args: CommandArgs::from_args(args)?,
        })
    }

    pub fn glob(args: &[String]) -> Result<Self, SaltApiError> {
        Self::run(TargetKind::Glob, args)
    }

    pub fn grain(args: &[String]) -> Result<Self, SaltApiError> {
        Self::run(TargetKind::Grain, args)
    }

    /// Issue the call through the shared session and return the raw body.
    pub async fn send(&self, session: &SessionHandle) -> Result<Value, SaltApiError> {
        let api = session.connect().await?;
        match self {
            Self::ListMinions => api.list_minions().await,
            Self::Run { kind, args } => {
                api.run_command(args.target(), *kind, args.command())
                    .await
            }
        }
    }
}
