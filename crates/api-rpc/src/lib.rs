//! JSON-RPC API Layer
//!
//! Serves the discovered queue list to dashboards. Every view method fires
//! the refresh trigger before answering; admin methods never do.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
