//! JSON-RPC view tests
//!
//! Handler-level checks that view methods refresh first and admin methods
//! never do, plus the wire shape of each response.

use std::sync::Arc;

use bullboard_api_rpc::types::{ListQueuesRequest, QueueCountsRequest, StatusRequest};
use bullboard_api_rpc::RpcHandler;
use bullboard_core::application::{builder_for, DiscoveryConfig, QueueRegistry, RefreshCoordinator};
use bullboard_core::domain::{ConnectionParams, EngineConfig, EngineVariant, JobCounts};
use bullboard_core::port::key_store::mocks::InMemoryKeyStore;
use bullboard_core::port::queue_client::mocks::MockQueueClientFactory;
use bullboard_core::port::time_provider::SystemTimeProvider;

fn handler(store: &InMemoryKeyStore, clients: Arc<MockQueueClientFactory>) -> RpcHandler {
    let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default())
        .with_key_prefix("bull");
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::new(store.clone()),
        builder_for(&config, clients),
        Arc::new(QueueRegistry::new()),
        DiscoveryConfig::new(config.namespace()),
        Arc::new(SystemTimeProvider),
    ));
    RpcHandler::new(coordinator, config.variant)
}

/// Every page view reflects the store at request time
#[tokio::test]
async fn test_each_view_sees_current_store() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let handler = handler(&store, Arc::new(MockQueueClientFactory::new()));

    let first = handler.list_queues(ListQueuesRequest::default()).await.unwrap();
    store.set_keys(["bull:emails:1", "bull:sms:1"]);
    let second = handler.list_queues(ListQueuesRequest::default()).await.unwrap();

    assert_eq!(first.queues.len(), 1);
    assert_eq!(second.queues.len(), 2);
    assert_eq!(second.generation, 2);
    assert_eq!(store.connect_count(), 2);
}

/// Status is read-only and never touches the store
#[tokio::test]
async fn test_status_does_not_refresh() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let handler = handler(&store, Arc::new(MockQueueClientFactory::new()));

    let before = handler.status(StatusRequest::default()).await.unwrap();
    assert_eq!(before.generation, 0);
    assert_eq!(before.last_outcome, None);
    assert_eq!(store.connect_count(), 0);

    handler.list_queues(ListQueuesRequest::default()).await.unwrap();
    let after = handler.status(StatusRequest::default()).await.unwrap();

    assert_eq!(after.generation, 1);
    assert_eq!(after.queue_count, 1);
    assert_eq!(after.state, "IDLE");
    assert_eq!(after.last_outcome.as_deref(), Some("PUBLISHED"));
    assert_eq!(after.namespace, "bull");
    assert_eq!(after.variant, "BULLMQ");
    assert!(!after.refreshing);
    assert_eq!(store.connect_count(), 1);
}

/// Status reports the most recent failure while the list stays stale
#[tokio::test]
async fn test_status_reports_last_failure() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let handler = handler(&store, Arc::new(MockQueueClientFactory::new()));
    handler.list_queues(ListQueuesRequest::default()).await.unwrap();

    store.set_fail_scan(true);
    let list = handler.list_queues(ListQueuesRequest::default()).await.unwrap();
    let status = handler.status(StatusRequest::default()).await.unwrap();

    assert!(!list.refreshed);
    assert_eq!(list.queues.len(), 1);
    assert_eq!(status.last_outcome.as_deref(), Some("FAILED"));
    assert!(status.last_error.is_some());
    assert_eq!(status.generation, 1);
}

/// Counts for all queues, in list order
#[tokio::test]
async fn test_counts_for_all_queues() {
    let store = InMemoryKeyStore::new(["bull:sms:1", "bull:emails:1"]);
    let clients = Arc::new(MockQueueClientFactory::new());
    clients.set_counts(JobCounts {
        waiting: 2,
        active: 1,
        completed: 10,
        ..JobCounts::default()
    });
    let handler = handler(&store, clients);

    let response = handler
        .queue_counts(QueueCountsRequest::default())
        .await
        .unwrap();

    assert!(response.refreshed);
    let names: Vec<&str> = response.queues.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["emails", "sms"]);
    for queue in &response.queues {
        assert_eq!(queue.counts.unwrap().total(), 13);
        assert!(queue.error.is_none());
    }
}

/// Serialized list response keeps its documented field names
#[tokio::test]
async fn test_list_response_wire_shape() {
    let store = InMemoryKeyStore::new(["bull:emails:1"]);
    let handler = handler(&store, Arc::new(MockQueueClientFactory::new()));

    let response = handler.list_queues(ListQueuesRequest::default()).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["generation"], 1);
    assert_eq!(json["refreshed"], true);
    assert!(json["refresh_error"].is_null());
    assert_eq!(json["queues"][0]["name"], "emails");
    assert_eq!(json["queues"][0]["variant"], "BULLMQ");
    assert_eq!(json["queues"][0]["prefix"], "bull");
    assert_eq!(json["queues"][0]["key_prefix"], "bull");
}
