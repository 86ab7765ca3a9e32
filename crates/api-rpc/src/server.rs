//! JSON-RPC Server
//!
//! Implements the JSON-RPC 2.0 server over HTTP on a configurable address.

use crate::handler::RpcHandler;
use crate::types::{ListQueuesRequest, QueueCountsRequest, StatusRequest};
use bullboard_core::application::RefreshCoordinator;
use bullboard_core::domain::EngineVariant;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 3000;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        coordinator: Arc<RefreshCoordinator>,
        variant: EngineVariant,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(coordinator, variant)),
        }
    }

    /// Method table served over HTTP
    fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());

        // View methods (refresh first)
        let handler = self.handler.clone();
        module
            .register_async_method("queues.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ListQueuesRequest = parse_or_default(&params)?;
                    handler.list_queues(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queues.counts.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: QueueCountsRequest = parse_or_default(&params)?;
                    handler.queue_counts(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Admin APIs
        let handler = self.handler.clone();
        module
            .register_async_method("admin.status.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StatusRequest = parse_or_default(&params)?;
                    handler.status(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let module = self.module()?;

        info!(addr = %addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}

/// Omitted or null params mean "all defaults"
fn parse_or_default<T>(params: &Params<'_>) -> Result<T, ErrorObjectOwned>
where
    T: DeserializeOwned + Default,
{
    Ok(params.parse::<Option<T>>()?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use bullboard_core::application::{builder_for, DiscoveryConfig, QueueRegistry};
    use bullboard_core::domain::{ConnectionParams, EngineConfig};
    use bullboard_core::port::key_store::mocks::InMemoryKeyStore;
    use bullboard_core::port::queue_client::mocks::MockQueueClientFactory;
    use bullboard_core::port::time_provider::SystemTimeProvider;
    use serde_json::Value;

    fn server(store: &InMemoryKeyStore) -> RpcServer {
        let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default())
            .with_key_prefix("bull");
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::new(store.clone()),
            builder_for(&config, Arc::new(MockQueueClientFactory::new())),
            Arc::new(QueueRegistry::new()),
            DiscoveryConfig::new(config.namespace()),
            Arc::new(SystemTimeProvider),
        ));
        RpcServer::new(RpcServerConfig::default(), coordinator, config.variant)
    }

    async fn request(module: &RpcModule<()>, body: &str) -> Value {
        let (response, _) = module.raw_json_request(body, 1).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn test_missing_params_parse_to_defaults() {
        let counts: QueueCountsRequest = parse_or_default(&Params::new(None)).unwrap();
        assert_eq!(counts.queue, None);
        let counts: QueueCountsRequest = parse_or_default(&Params::new(Some("null"))).unwrap();
        assert_eq!(counts.queue, None);
        let counts: QueueCountsRequest = parse_or_default(&Params::new(Some("{}"))).unwrap();
        assert_eq!(counts.queue, None);

        let _: ListQueuesRequest = parse_or_default(&Params::new(None)).unwrap();
        let _: StatusRequest = parse_or_default(&Params::new(None)).unwrap();
    }

    #[test]
    fn test_present_params_are_parsed() {
        let counts: QueueCountsRequest =
            parse_or_default(&Params::new(Some(r#"{"queue":"sms"}"#))).unwrap();
        assert_eq!(counts.queue.as_deref(), Some("sms"));

        let err = parse_or_default::<QueueCountsRequest>(&Params::new(Some(r#"{"queue":7}"#)))
            .unwrap_err();
        assert_eq!(err.code(), jsonrpsee::types::error::INVALID_PARAMS_CODE);
    }

    #[tokio::test]
    async fn test_methods_accept_requests_without_params() {
        let store = InMemoryKeyStore::new(["bull:emails:1"]);
        let module = server(&store).module().unwrap();

        let list = request(&module, r#"{"jsonrpc":"2.0","method":"queues.list.v1","id":1}"#).await;
        assert!(list["error"].is_null(), "unexpected error: {}", list);
        assert_eq!(list["result"]["refreshed"], true);
        assert_eq!(list["result"]["queues"][0]["name"], "emails");

        let counts =
            request(&module, r#"{"jsonrpc":"2.0","method":"queues.counts.v1","id":2}"#).await;
        assert_eq!(counts["result"]["queues"][0]["name"], "emails");

        let status =
            request(&module, r#"{"jsonrpc":"2.0","method":"admin.status.v1","id":3}"#).await;
        assert_eq!(status["result"]["generation"], 2);
    }

    #[tokio::test]
    async fn test_counts_errors_reach_the_wire() {
        let store = InMemoryKeyStore::new(["bull:emails:1"]);
        let module = server(&store).module().unwrap();

        let response = request(
            &module,
            r#"{"jsonrpc":"2.0","method":"queues.counts.v1","params":{"queue":"missing"},"id":1}"#,
        )
        .await;

        assert_eq!(response["error"]["code"], code::NOT_FOUND);
    }
}
