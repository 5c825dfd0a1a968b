//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server:
//! configuration, error handling, the JSON-RPC wire types, the request
//! dispatcher, path confinement, and the transport layer.

pub mod config;
pub mod error;
pub mod protocol;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use security::{PathSecurityError, validate_path};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
