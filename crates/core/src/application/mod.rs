// Application Layer - Queue discovery pipeline

pub mod adapter;
pub mod constants;
pub mod extractor;
pub mod refresh;
pub mod registry;
pub mod scanner;

// Re-exports
pub use adapter::{builder_for, HandleBuilder, LegacyHandleBuilder, ModernHandleBuilder};
pub use extractor::{extract_queue_ids, Extraction};
pub use refresh::{
    DiscoveryConfig, RefreshCoordinator, RefreshFailure, RefreshOutcome, RefreshReport,
    RefreshState,
};
pub use registry::{QueueRegistry, RegistrySnapshot};
pub use scanner::KeyScanner;
