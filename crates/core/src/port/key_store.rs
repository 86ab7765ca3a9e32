// Key Store Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Connection factory for the shared key-value store
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Open a scoped connection
    ///
    /// # Errors
    /// - AppError::StoreUnavailable if the connection cannot be established
    async fn connect(&self) -> Result<Box<dyn KeyStoreSession>>;
}

/// One open connection to the store
///
/// Dropping a session releases the connection; `disconnect` does it
/// explicitly and reports failures.
#[async_trait]
pub trait KeyStoreSession: Send {
    /// All keys matching a glob pattern
    async fn keys(&mut self, pattern: &str) -> Result<Vec<String>>;

    /// Release the connection
    async fn disconnect(self: Box<Self>) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct StoreState {
        keys: Mutex<Vec<String>>,
        fail_connect: AtomicBool,
        fail_scan: AtomicBool,
        fail_disconnect: AtomicBool,
        scan_delay: Mutex<Option<Duration>>,
        connects: AtomicUsize,
        scans: AtomicUsize,
        disconnects: AtomicUsize,
        open_sessions: AtomicUsize,
    }

    /// In-memory key store with failure injection and connection accounting
    #[derive(Clone, Default)]
    pub struct InMemoryKeyStore {
        state: Arc<StoreState>,
    }

    impl InMemoryKeyStore {
        pub fn new<I, S>(keys: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let store = Self::default();
            store.set_keys(keys);
            store
        }
        pub fn set_keys<I, S>(&self, keys: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            *self.state.keys.lock().unwrap() = keys.into_iter().map(Into::into).collect();
        }
        pub fn set_fail_connect(&self, fail: bool) {
            self.state.fail_connect.store(fail, Ordering::SeqCst);
        }
        pub fn set_fail_scan(&self, fail: bool) {
            self.state.fail_scan.store(fail, Ordering::SeqCst);
        }
        pub fn set_fail_disconnect(&self, fail: bool) {
            self.state.fail_disconnect.store(fail, Ordering::SeqCst);
        }
        pub fn set_scan_delay(&self, delay: Duration) {
            *self.state.scan_delay.lock().unwrap() = Some(delay);
        }
        pub fn connect_count(&self) -> usize {
            self.state.connects.load(Ordering::SeqCst)
        }
        pub fn scan_count(&self) -> usize {
            self.state.scans.load(Ordering::SeqCst)
        }
        pub fn disconnect_count(&self) -> usize {
            self.state.disconnects.load(Ordering::SeqCst)
        }
        /// Sessions neither disconnected nor dropped
        pub fn open_sessions(&self) -> usize {
            self.state.open_sessions.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyStore for InMemoryKeyStore {
        async fn connect(&self) -> Result<Box<dyn KeyStoreSession>> {
            if self.state.fail_connect.load(Ordering::SeqCst) {
                return Err(AppError::StoreUnavailable("connection refused".to_string()));
            }
            self.state.connects.fetch_add(1, Ordering::SeqCst);
            self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(InMemorySession {
                state: Arc::clone(&self.state),
            }))
        }
    }

    struct InMemorySession {
        state: Arc<StoreState>,
    }

    #[async_trait]
    impl KeyStoreSession for InMemorySession {
        async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
            self.state.scans.fetch_add(1, Ordering::SeqCst);
            let delay = *self.state.scan_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.state.fail_scan.load(Ordering::SeqCst) {
                return Err(AppError::StoreUnavailable("scan failed".to_string()));
            }
            let prefix = literal_prefix(pattern);
            Ok(self
                .state
                .keys
                .lock()
                .unwrap()
                .iter()
                .filter(|key| key.starts_with(&prefix))
                .cloned()
                .collect())
        }

        async fn disconnect(self: Box<Self>) -> Result<()> {
            self.state.disconnects.fetch_add(1, Ordering::SeqCst);
            if self.state.fail_disconnect.load(Ordering::SeqCst) {
                return Err(AppError::StoreUnavailable("disconnect failed".to_string()));
            }
            Ok(())
        }
    }

    impl Drop for InMemorySession {
        fn drop(&mut self) {
            self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }

    // Only `<literal>*` patterns are supported
    fn literal_prefix(pattern: &str) -> String {
        let body = pattern.strip_suffix('*').unwrap_or(pattern);
        let mut prefix = String::with_capacity(body.len());
        let mut escaped = false;
        for c in body.chars() {
            if c == '\\' && !escaped {
                escaped = true;
                continue;
            }
            escaped = false;
            prefix.push(c);
        }
        prefix
    }
}
