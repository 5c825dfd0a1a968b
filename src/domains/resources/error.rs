//! Resource-specific error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::security::PathSecurityError;

/// Errors that can occur during resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested URI is missing or not present in the index.
    #[error("Resource not found")]
    NotFound { uri: String },

    /// The backing file resolves outside the content root or breaks the
    /// symlink policy.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The content root could not be opened.
    #[error("Content root {path:?} unavailable: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while reading the backing file.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A background task failed before producing a result.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    /// Create a new "not found" error.
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::NotFound { uri: uri.into() }
    }

    /// Create a new "access denied" error.
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new "root unavailable" error.
    pub fn root_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootUnavailable {
            path: path.into(),
            source,
        }
    }
}

impl From<PathSecurityError> for ResourceError {
    fn from(err: PathSecurityError) -> Self {
        match err {
            PathSecurityError::Io { error, .. } => Self::Io(error),
            other => Self::access_denied(other.to_string()),
        }
    }
}
