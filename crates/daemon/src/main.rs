//! Bull Board - Main Entry Point
//! Discovers queues on every dashboard request and serves them over JSON-RPC

mod logging;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

// Import workspace crates
use bullboard_api_rpc::RpcServer;
use bullboard_core::application::{builder_for, QueueRegistry, RefreshCoordinator, RefreshOutcome};
use bullboard_core::port::time_provider::SystemTimeProvider;
use bullboard_infra_redis::{RedisKeyStore, RedisQueueClientFactory};
use settings::Settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let settings = Settings::load().context("Failed to load settings")?;

    // 2. Initialize logging
    let log_dir = settings.log_dir();
    let _log_guard = logging::init(settings.log_format(), log_dir.as_deref());

    info!("Bull Board v{} starting...", VERSION);

    let engine = settings.engine_config()?;
    let discovery = settings.discovery_config(&engine)?;

    info!(
        host = %engine.connection.host,
        port = engine.connection.port,
        db = engine.connection.db,
        tls = engine.connection.tls,
        variant = %engine.variant,
        namespace = %discovery.namespace,
        "Queue engine configured"
    );

    // 3. Setup dependencies (DI wiring)
    let store = Arc::new(
        RedisKeyStore::new(&engine.connection, settings.scan_count)
            .context("Redis key store setup failed")?,
    );
    let clients = Arc::new(RedisQueueClientFactory::new());
    let registry = Arc::new(QueueRegistry::new());
    let coordinator = Arc::new(RefreshCoordinator::new(
        store,
        builder_for(&engine, clients),
        registry,
        discovery,
        Arc::new(SystemTimeProvider),
    ));

    // 4. Warm-up refresh (non-fatal: the first request retries)
    info!("Fetching queue list, please wait...");
    match coordinator.trigger().await {
        RefreshOutcome::Failed(failure) => {
            warn!(error = %failure.error, "Initial queue discovery failed (serving empty list)")
        }
        outcome => info!(
            generation = outcome.generation(),
            queues = coordinator.registry().snapshot().len(),
            "Initial queue discovery completed"
        ),
    }

    // 5. Start JSON-RPC server
    let rpc_config = settings.rpc_config();
    let rpc_handle = RpcServer::new(rpc_config.clone(), coordinator.clone(), engine.variant)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(
        "Bull Board is started http://{}:{}",
        rpc_config.host, rpc_config.port
    );
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
