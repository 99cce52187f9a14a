//! Chat commands backed by salt-api.
//!
//! Each command pairs a request builder with a template: build and validate
//! the request, send it through the shared session, check the response shape,
//! render, and reply to the sender.

use tracing::debug;

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::error::Result;
use crate::render::{render_minions, render_run};
use crate::salt::{SaltRequest, SessionHandle, TargetKind, validate};

/// The chat-visible salt-api commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltCommand {
    Minions,
    Glob,
    Grain,
}

impl SaltCommand {
    pub const ALL: [SaltCommand; 3] = [Self::Minions, Self::Glob, Self::Grain];

    pub fn name(self) -> &'static str {
        match self {
            Self::Minions => "minions",
            Self::Glob => "glob",
            Self::Grain => "grain",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    /// Argument synopsis shown by `help`.
    pub fn usage(self) -> &'static str {
        match self {
            Self::Minions => "",
            Self::Glob => r#" "<selector>" "<command>""#,
            Self::Grain => r#" "<grain:value>" "<command>""#,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Minions => "list every minion known to the master",
            Self::Glob => "run a shell command on minions whose id matches a glob",
            Self::Grain => "run a shell command on minions matching a grain",
        }
    }

    /// `None` for minion listing.
    pub fn target_kind(self) -> Option<TargetKind> {
        match self {
            Self::Minions => None,
            Self::Glob => Some(TargetKind::Glob),
            Self::Grain => Some(TargetKind::Grain),
        }
    }

    fn request(self, args: &[String]) -> Result<SaltRequest> {
        let request = match self.target_kind() {
            None => SaltRequest::list_minions(),
            Some(kind) => SaltRequest::run(kind, args)?,
        };
        Ok(request)
    }
}

/// Command handlers sharing one salt-api session.
pub struct SaltCommands {
    session: SessionHandle,
}

impl SaltCommands {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// `minions`: list every minion the master knows about.
    pub async fn minions(&self, channel: &dyn Channel, msg: &IncomingMessage) -> Result<()> {
        self.run(SaltCommand::Minions, channel, msg, &[]).await
    }

    /// `glob <selector> <command>`.
    pub async fn glob(
        &self,
        channel: &dyn Channel,
        msg: &IncomingMessage,
        args: &[String],
    ) -> Result<()> {
        self.run(SaltCommand::Glob, channel, msg, args).await
    }

    /// `grain <grain:value> <command>`.
    pub async fn grain(
        &self,
        channel: &dyn Channel,
        msg: &IncomingMessage,
        args: &[String],
    ) -> Result<()> {
        self.run(SaltCommand::Grain, channel, msg, args).await
    }

    /// Shared flow for all three commands. Nothing is sent to the channel
    /// unless every step succeeds.
    pub async fn run(
        &self,
        command: SaltCommand,
        channel: &dyn Channel,
        msg: &IncomingMessage,
        args: &[String],
    ) -> Result<()> {
        let request = command.request(args)?;
        debug!(command = command.name(), user = %msg.user_id, "Sending salt-api request");

        let body = request.send(&self.session).await?;
        let response = validate(&body)?;

        let text = match &request {
            SaltRequest::ListMinions => render_minions(&response)?,
            SaltRequest::Run { kind, args } => render_run(*kind, &response, args)?,
        };

        channel.respond(msg, OutgoingResponse::text(text)).await?;
        Ok(())
    }
}
