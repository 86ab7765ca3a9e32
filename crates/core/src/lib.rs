// Bull Board Core - Queue Discovery Engine & Ports
// NO infrastructure dependencies: redis and RPC live in adapter crates

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
