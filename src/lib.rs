//! Tsunami context MCP server library.
//!
//! Exposes the markdown documents under a content root as Model Context
//! Protocol resources, answering `initialize`, `resources/list` and
//! `resources/read` over line-delimited JSON-RPC.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, protocol types, the request
//!   dispatcher, path confinement and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **resources**: the resource index and the list/read service
//!
//! # Example
//!
//! ```rust,no_run
//! use tsunami_context_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
