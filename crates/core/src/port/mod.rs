// Port Layer - Interfaces for external dependencies

pub mod key_store;
pub mod queue_client;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use key_store::{KeyStore, KeyStoreSession};
pub use queue_client::{QueueClient, QueueClientFactory};
pub use time_provider::TimeProvider;
