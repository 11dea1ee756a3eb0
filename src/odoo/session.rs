//! Shared connection slot
//!
//! Both front-ends keep exactly one active Odoo connection. `Session` is the
//! cloneable handle to it; every request reads the current client from here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::OdooError;
use crate::odoo::client::OdooClient;
use crate::odoo::types::{ConnectionInfo, ConnectionParams};

/// Handle to the process-wide Odoo connection
#[derive(Clone)]
pub struct Session {
    client: Arc<RwLock<Option<Arc<OdooClient>>>>,
    timeout: Duration,
}

impl Session {
    /// Create an empty session
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Arc::new(RwLock::new(None)),
            timeout,
        }
    }

    /// Authenticate and make the new client current
    ///
    /// The previous connection is kept if authentication fails.
    pub async fn connect(&self, params: ConnectionParams) -> Result<Arc<OdooClient>, OdooError> {
        tracing::info!(url = %params.url, database = %params.database, "Connecting to Odoo");

        let client = Arc::new(OdooClient::connect(params, self.timeout).await?);
        *self.client.write().await = Some(client.clone());

        Ok(client)
    }

    /// Current client, or `NotConnected`
    pub async fn client(&self) -> Result<Arc<OdooClient>, OdooError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(OdooError::NotConnected)
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Description of the current connection
    pub async fn info(&self) -> Option<ConnectionInfo> {
        self.client.read().await.as_ref().map(|c| c.info())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}
