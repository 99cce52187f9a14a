//! Lazily established salt-api session.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Connector, SaltApi};
use crate::config::SaltApiConfig;
use crate::error::SaltApiError;

/// Caches one authenticated connection for the life of the process.
///
/// The slot is checked and filled under a single mutex, so concurrent first
/// use logs in exactly once and every caller gets the same connection. A
/// failed login leaves the slot empty; the next command tries again.
pub struct SessionHandle {
    config: SaltApiConfig,
    connector: Arc<dyn Connector>,
    slot: Mutex<Option<Arc<dyn SaltApi>>>,
}

impl SessionHandle {
    pub fn new(config: SaltApiConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached connection, logging in first if there is none.
    pub async fn connect(&self) -> Result<Arc<dyn SaltApi>, SaltApiError> {
        let mut slot = self.slot.lock().await;
        if let Some(api) = slot.as_ref() {
            return Ok(Arc::clone(api));
        }

        let api = self.connector.connect(&self.config).await?;
        *slot = Some(Arc::clone(&api));
        Ok(api)
    }

    /// Whether a connection has been established.
    pub async fn is_established(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}
