//! salt-api access: connection, session caching, requests and response checks.

mod client;
mod request;
mod response;
mod session;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SaltApiConfig;
use crate::error::SaltApiError;

pub use self::client::{HttpConnector, HttpSaltClient};
pub use self::request::{CommandArgs, SaltRequest};
pub use self::response::{ValidatedResponse, validate};
pub use self::session::SessionHandle;

/// How a run request selects its minions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Shell-style glob on the minion id.
    Glob,
    /// `grain:value` match on minion-reported grains.
    Grain,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Grain => "grain",
        }
    }
}

/// An authenticated salt-api connection.
///
/// Both calls return the raw JSON body; shape checks happen in [`validate`].
#[async_trait]
pub trait SaltApi: Send + Sync {
    /// `GET /minions`.
    async fn list_minions(&self) -> Result<Value, SaltApiError>;

    /// Run `cmd.run` with `command` on the minions matched by `target`.
    async fn run_command(
        &self,
        target: &str,
        kind: TargetKind,
        command: &str,
    ) -> Result<Value, SaltApiError>;
}

/// Opens and authenticates a new [`SaltApi`] connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &SaltApiConfig) -> Result<Arc<dyn SaltApi>, SaltApiError>;
}
