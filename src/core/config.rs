//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a `.env` file, or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default URI prefix for indexed resources.
pub const DEFAULT_URI_PREFIX: &str = "tsunami://context";

/// Name of the content directory expected next to the executable.
const CONTENT_DIR_NAME: &str = "context";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Resources domain configuration.
    pub resources: ResourcesConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration for the resources domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Directory whose subdirectories are the resource categories.
    pub content_root: PathBuf,

    /// Prefix placed before `<category>/<path>` in every resource URI.
    pub uri_prefix: String,

    /// Index markdown files in nested folders of a category as well.
    pub recursive: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Whether symlinks inside the content root are followed.
    /// Symlinks resolving outside the content root are always rejected.
    pub allow_symlinks: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            uri_prefix: DEFAULT_URI_PREFIX.to_string(),
            recursive: false,
        }
    }
}

impl ResourcesConfig {
    /// Create a resources config rooted at `content_root` with default options.
    pub fn with_root(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            ..Default::default()
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allow_symlinks: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tsunami-context".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            resources: ResourcesConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// The content root shipped alongside the installed binary.
///
/// Falls back to `./context` when the executable location is unknown.
fn default_content_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(CONTENT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(CONTENT_DIR_NAME))
}

/// Parse a boolean flag the way the env loader accepts it.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_CONTENT_ROOT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(value) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = parse_flag(&value).unwrap_or(true);
        }

        if let Ok(root) = std::env::var("MCP_CONTENT_ROOT") {
            config.resources.content_root = PathBuf::from(root);
            info!(
                "Content root set from environment: {:?}",
                config.resources.content_root
            );
        }

        if let Ok(prefix) = std::env::var("MCP_URI_PREFIX") {
            config.resources.uri_prefix = prefix.trim_end_matches('/').to_string();
        }

        if let Ok(value) = std::env::var("MCP_RECURSIVE") {
            match parse_flag(&value) {
                Some(recursive) => config.resources.recursive = recursive,
                None => warn!("Ignoring invalid MCP_RECURSIVE value: {}", value),
            }
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(value) = std::env::var("MCP_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = parse_flag(&value).unwrap_or(true);
            info!("Symlinks allowed: {}", config.security.allow_symlinks);
        }

        config
    }
}
