// Key Scanner - scoped store access for one refresh cycle

use crate::domain::namespace_pattern;
use crate::error::{AppError, Result};
use crate::port::{KeyStore, KeyStoreSession};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lists raw keys under a namespace
///
/// The caller owns the session between `connect` and `release`; a session
/// that is never released is still closed when dropped.
pub struct KeyScanner {
    store: Arc<dyn KeyStore>,
    connect_timeout: Duration,
}

impl KeyScanner {
    pub fn new(store: Arc<dyn KeyStore>, connect_timeout: Duration) -> Self {
        Self {
            store,
            connect_timeout,
        }
    }

    /// Open a connection, bounded by the connect timeout
    pub async fn connect(&self) -> Result<Box<dyn KeyStoreSession>> {
        tokio::time::timeout(self.connect_timeout, self.store.connect())
            .await
            .map_err(|_| {
                AppError::StoreUnavailable(format!(
                    "connect timed out after {}ms",
                    self.connect_timeout.as_millis()
                ))
            })?
    }

    /// Every key matching `<namespace>:*`
    pub async fn scan(
        &self,
        session: &mut dyn KeyStoreSession,
        namespace: &str,
    ) -> Result<Vec<String>> {
        let pattern = namespace_pattern(namespace);
        let keys = session.keys(&pattern).await?;
        debug!(pattern = %pattern, keys = keys.len(), "Namespace scanned");
        Ok(keys)
    }

    /// Release the connection; failures are logged, never propagated
    pub async fn release(&self, session: Box<dyn KeyStoreSession>) {
        if let Err(e) = session.disconnect().await {
            warn!(error = %e, "Store disconnect failed");
        }
    }
}
