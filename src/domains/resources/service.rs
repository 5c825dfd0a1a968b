//! Resource service implementation.
//!
//! The ResourceService owns the frozen resource index and answers list and
//! read requests against it. File contents are read from disk on every read;
//! nothing is cached.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use super::error::ResourceError;
use super::index::{ResourceEntry, ResourceIndex};
use crate::core::config::{ResourcesConfig, SecurityConfig};
use crate::core::security::validate_path;

/// Service for listing and reading indexed resources.
#[derive(Debug, Clone)]
pub struct ResourceService {
    index: ResourceIndex,
}

/// Result of `resources/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResourcesResult {
    pub resources: Vec<ResourceEntry>,
}

/// Result of `resources/read`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

/// Inline text contents of one resource.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

impl ResourceService {
    /// Create a new ResourceService by scanning the configured content root.
    pub fn new(config: &ResourcesConfig, security: &SecurityConfig) -> Self {
        info!("Initializing ResourceService");
        Self {
            index: ResourceIndex::build(config, security),
        }
    }

    /// The underlying index.
    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    /// List all available resources in URI order.
    pub async fn list_resources(&self) -> ListResourcesResult {
        ListResourcesResult {
            resources: self.index.iter().cloned().collect(),
        }
    }

    /// Read a resource by URI.
    ///
    /// The backing file is confined to the content root again before it is
    /// read, so a file swapped for an escaping symlink after startup is
    /// refused.
    #[instrument(skip(self))]
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let entry = self
            .index
            .get(uri)
            .ok_or_else(|| ResourceError::not_found(uri))?;

        let path = self.confine(entry.file_path.clone()).await?;
        let text = tokio::fs::read_to_string(&path).await?;
        debug!("Read {} bytes from {:?}", text.len(), path);

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: entry.uri.clone(),
                mime_type: entry.mime_type.clone(),
                text,
            }],
        })
    }

    /// Re-check that `file_path` still resolves inside the content root.
    ///
    /// Canonicalization touches the filesystem synchronously, so it runs on
    /// the blocking pool.
    async fn confine(&self, file_path: PathBuf) -> Result<PathBuf, ResourceError> {
        let root = self.index.root().to_path_buf();
        let allow_symlinks = self.index.allow_symlinks();

        tokio::task::spawn_blocking(move || validate_path(&file_path, &root, allow_symlinks))
            .await
            .map_err(|e| ResourceError::internal(e.to_string()))?
            .map_err(ResourceError::from)
    }
}
