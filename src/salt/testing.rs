//! In-process salt-api fakes for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use super::{Connector, SaltApi, TargetKind};
use crate::config::SaltApiConfig;
use crate::error::SaltApiError;

pub(crate) fn test_config() -> SaltApiConfig {
    SaltApiConfig {
        url: "http://127.0.0.1:8080/".to_string(),
        username: "saltapi".to_string(),
        password: SecretString::from("saltapi".to_string()),
        eauth: "pam".to_string(),
    }
}

/// Serves one canned body for every call and counts logins and calls.
#[derive(Default)]
pub(crate) struct FakeConnector {
    pub(crate) logins: AtomicUsize,
    pub(crate) calls: Arc<AtomicUsize>,
    pub(crate) fail_first: usize,
    pub(crate) body: Value,
    pub(crate) login_delay: Option<Duration>,
}

impl FakeConnector {
    pub(crate) fn with_body(body: Value) -> Self {
        Self {
            body,
            ..Default::default()
        }
    }

    pub(crate) fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct FakeApi {
    body: Value,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SaltApi for FakeApi {
    async fn list_minions(&self) -> Result<Value, SaltApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }

    async fn run_command(
        &self,
        _target: &str,
        _kind: TargetKind,
        _command: &str,
    ) -> Result<Value, SaltApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _config: &SaltApiConfig) -> Result<Arc<dyn SaltApi>, SaltApiError> {
        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }
        let attempt = self.logins.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(SaltApiError::Connection);
        }
        Ok(Arc::new(FakeApi {
            body: self.body.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}
