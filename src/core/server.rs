//! MCP Server implementation and request dispatch.
//!
//! `McpServer` is constructed once at process start. It owns the resource
//! service (and with it the frozen index) behind an `Arc`, so clones handed
//! to concurrently running request tasks share the same read-only state.

use rmcp::model::ServerCapabilities;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::Config;
use super::error::{Error, Result};
use super::protocol::{JsonRpcRequest, JsonRpcResponse, methods};
use crate::domains::resources::{ResourceError, ResourceService};

/// MCP protocol revision announced in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Service for handling resource-related requests.
    resource_service: Arc<ResourceService>,
}

impl McpServer {
    /// Create a new MCP server, scanning the configured content root.
    pub fn new(config: Config) -> Self {
        let resource_service = ResourceService::new(&config.resources, &config.security);
        Self {
            config: Arc::new(config),
            resource_service: Arc::new(resource_service),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Number of indexed resources.
    pub fn resource_count(&self) -> usize {
        self.resource_service.index().len()
    }

    /// Handle one request.
    ///
    /// Returns `None` for notifications, which get no response. Every other
    /// request yields either a result or an error response; failures never
    /// escape this method.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            info!("Received notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();
        let response = match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!("Request {} failed: {}", request.method, e);
                JsonRpcResponse::from_error(id, &e)
            }
        };
        Some(response)
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        match request.method.as_str() {
            methods::INITIALIZE => Ok(self.initialize()),
            methods::LIST_RESOURCES => self.list_resources().await,
            methods::READ_RESOURCE => self.read_resource(request).await,
            other => Err(Error::method_not_found(other)),
        }
    }

    /// Handle `initialize`. Always succeeds, whatever the index holds.
    fn initialize(&self) -> Value {
        info!("Processing initialize request");

        let capabilities = ServerCapabilities::builder()
            .enable_resources()
            .enable_resources_subscribe()
            .enable_resources_list_changed()
            .build();

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "serverInfo": {
                "name": self.name(),
                "version": self.version()
            }
        })
    }

    /// Handle `resources/list`.
    async fn list_resources(&self) -> Result<Value> {
        info!("Listing resources");
        let listed = self.resource_service.list_resources().await;
        debug!("Listing {} resources", listed.resources.len());
        Ok(serde_json::to_value(listed)?)
    }

    /// Handle `resources/read`.
    async fn read_resource(&self, request: &JsonRpcRequest) -> Result<Value> {
        let Some(uri) = request.str_param("uri") else {
            return Err(ResourceError::not_found("").into());
        };

        info!("Reading resource: {}", uri);
        let result = self.resource_service.read_resource(uri).await?;
        Ok(serde_json::to_value(result)?)
    }
}
