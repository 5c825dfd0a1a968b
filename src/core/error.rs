//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies, and maps each of them onto a
//! JSON-RPC error code.

use rmcp::model::ErrorCode;
use thiserror::Error;

use crate::domains::resources::ResourceError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the resources domain.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The requested method is not served.
    #[error("Method not found")]
    MethodNotFound(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new "method not found" error.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound(method.into())
    }

    /// The JSON-RPC error code reported to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            Self::Resource(ResourceError::NotFound { .. }) => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }
}
