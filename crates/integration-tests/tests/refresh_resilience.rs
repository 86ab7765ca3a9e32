//! Refresh resilience tests
//!
//! Store outages, adapter failures, concurrent triggers and connection
//! accounting across the whole refresh cycle.

use std::sync::Arc;
use std::time::Duration;

use bullboard_core::application::{
    builder_for, DiscoveryConfig, QueueRegistry, RefreshCoordinator, RefreshOutcome, RefreshState,
};
use bullboard_core::domain::{ConnectionParams, EngineConfig, EngineVariant};
use bullboard_core::error::AppError;
use bullboard_core::port::key_store::mocks::InMemoryKeyStore;
use bullboard_core::port::queue_client::mocks::MockQueueClientFactory;
use bullboard_core::port::time_provider::SystemTimeProvider;
use futures::future::join_all;

fn coordinator(store: &InMemoryKeyStore, clients: Arc<MockQueueClientFactory>) -> RefreshCoordinator {
    let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default())
        .with_key_prefix("bull");
    RefreshCoordinator::new(
        Arc::new(store.clone()),
        builder_for(&config, clients),
        Arc::new(QueueRegistry::new()),
        DiscoveryConfig::new(config.namespace()).with_connect_timeout(Duration::from_secs(1)),
        Arc::new(SystemTimeProvider),
    )
}

/// Store unreachable: previous list stays, caller still gets an answer
#[tokio::test]
async fn test_connect_failure_keeps_previous_list() {
    let store = InMemoryKeyStore::new(["bull:emails:1", "bull:sms:1"]);
    let coordinator = coordinator(&store, Arc::new(MockQueueClientFactory::new()));
    assert!(coordinator.trigger().await.is_published());

    store.set_fail_connect(true);
    store.set_keys(["bull:other:1"]);
    let outcome = coordinator.trigger().await;

    let RefreshOutcome::Failed(failure) = &outcome else {
        panic!("expected a failed outcome, got {:?}", outcome);
    };
    assert_eq!(failure.stage, RefreshState::Connecting);
    assert!(matches!(*failure.error, AppError::StoreUnavailable(_)));

    let snapshot = coordinator.registry().snapshot();
    assert_eq!(snapshot.queue_names(), vec!["emails", "sms"]);
    assert_eq!(snapshot.generation, 1);
    assert_eq!(coordinator.state(), RefreshState::Idle);
}

/// Scan fails mid-cycle: previous list stays and the connection is released
#[tokio::test]
async fn test_scan_failure_keeps_previous_list_and_releases() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let coordinator = coordinator(&store, Arc::new(MockQueueClientFactory::new()));
    coordinator.trigger().await;

    store.set_fail_scan(true);
    let outcome = coordinator.trigger().await;

    assert!(matches!(
        &outcome,
        RefreshOutcome::Failed(failure) if failure.stage == RefreshState::Scanning
    ));
    assert_eq!(coordinator.registry().snapshot().queue_names(), vec!["emails"]);
    assert_eq!(store.connect_count(), 2);
    assert_eq!(store.disconnect_count(), 2);
    assert_eq!(store.open_sessions(), 0);
}

/// One handle fails to build: nothing from that cycle is published
#[tokio::test]
async fn test_construction_failure_publishes_nothing() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let clients = Arc::new(MockQueueClientFactory::new());
    let coordinator = coordinator(&store, clients.clone());
    coordinator.trigger().await;

    store.set_keys(["bull:emails:1", "bull:broken:1", "bull:sms:1"]);
    clients.reject_queue("broken");
    let outcome = coordinator.trigger().await;

    let RefreshOutcome::Failed(failure) = &outcome else {
        panic!("expected a failed outcome, got {:?}", outcome);
    };
    assert_eq!(failure.stage, RefreshState::Building);
    assert!(matches!(
        &*failure.error,
        AppError::AdapterConstructionFailed { queue, .. } if queue == "broken"
    ));
    assert_eq!(coordinator.registry().snapshot().queue_names(), vec!["emails"]);
    assert_eq!(store.open_sessions(), 0);
}

/// Recovery after an outage publishes the current store contents
#[tokio::test]
async fn test_recovers_after_outage() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let coordinator = coordinator(&store, Arc::new(MockQueueClientFactory::new()));
    coordinator.trigger().await;

    store.set_fail_connect(true);
    assert!(!coordinator.trigger().await.is_published());

    store.set_fail_connect(false);
    store.set_keys(["bull:emails:1", "bull:sms:1"]);
    let outcome = coordinator.trigger().await;

    assert!(outcome.is_published());
    // The failed cycle consumed generation 2
    assert_eq!(outcome.generation(), 3);
    assert_eq!(
        coordinator.registry().snapshot().queue_names(),
        vec!["emails", "sms"]
    );
}

/// Disconnect errors are logged, never surfaced
#[tokio::test]
async fn test_disconnect_failure_does_not_fail_cycle() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    store.set_fail_disconnect(true);
    let coordinator = coordinator(&store, Arc::new(MockQueueClientFactory::new()));

    let outcome = coordinator.trigger().await;

    assert!(outcome.is_published());
    assert_eq!(store.disconnect_count(), 1);
    assert_eq!(store.open_sessions(), 0);
}

/// Many simultaneous view requests share a single cycle
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_share_one_cycle() {
    let store = InMemoryKeyStore::new(["bull:emails:1", "bull:sms:1"]);
    store.set_scan_delay(Duration::from_millis(100));
    let coordinator = Arc::new(coordinator(&store, Arc::new(MockQueueClientFactory::new())));

    let outcomes = join_all((0..16).map(|_| {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.trigger().await })
    }))
    .await;

    assert_eq!(store.connect_count(), 1);
    assert_eq!(store.scan_count(), 1);
    assert_eq!(store.open_sessions(), 0);
    for outcome in outcomes {
        let outcome = outcome.unwrap();
        assert!(outcome.is_published());
        assert_eq!(outcome.generation(), 1);
    }
    assert_eq!(coordinator.registry().generation(), 1);
}

/// A trigger after the cycle finished starts a fresh one
#[tokio::test]
async fn test_sequential_triggers_run_separate_cycles() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let coordinator = coordinator(&store, Arc::new(MockQueueClientFactory::new()));

    for expected in 1..=3 {
        assert_eq!(coordinator.trigger().await.generation(), expected);
    }
    assert_eq!(store.connect_count(), 3);
    assert_eq!(store.disconnect_count(), 3);
    assert!(!coordinator.is_refreshing());
}

/// State is observable while a cycle is in progress
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_visible_during_cycle() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    store.set_scan_delay(Duration::from_millis(300));
    let coordinator = Arc::new(coordinator(&store, Arc::new(MockQueueClientFactory::new())));

    let background = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.trigger().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(coordinator.is_refreshing());
    assert_eq!(coordinator.state(), RefreshState::Scanning);
    assert_eq!(store.open_sessions(), 1);

    let outcome = background.await.unwrap();
    assert!(outcome.is_published());
    assert_eq!(coordinator.state(), RefreshState::Idle);
    assert_eq!(store.open_sessions(), 0);
}

/// Dropping the caller does not cancel the cycle or leak the connection
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_abandoned_trigger_still_completes() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    store.set_scan_delay(Duration::from_millis(100));
    let coordinator = Arc::new(coordinator(&store, Arc::new(MockQueueClientFactory::new())));

    let caller = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.trigger().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    caller.abort();

    let mut waited = 0;
    while coordinator.is_refreshing() && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }

    assert_eq!(coordinator.registry().snapshot().queue_names(), vec!["emails"]);
    assert_eq!(store.open_sessions(), 0);
    assert!(coordinator.last_outcome().unwrap().is_published());
}
