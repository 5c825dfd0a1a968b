//! STDIO transport implementation.
//!
//! Requests arrive one per line on stdin and responses leave one per line on
//! stdout. Diagnostics go to stderr only.

use tracing::info;

use super::TransportResult;
use super::lines::serve_lines;
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin is closed.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        serve_lines(server, tokio::io::stdin(), tokio::io::stdout()).await?;

        info!("STDIO transport finished: stdin closed");
        Ok(())
    }
}
