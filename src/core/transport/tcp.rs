//! TCP transport implementation.
//!
//! Each accepted connection runs the same line-delimited loop as STDIO.
//! Connections are independent; a client closing its socket ends only its
//! own session.

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::lines::serve_lines;
use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> TransportResult<TcpListener> {
        let addr = self.address();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))
    }

    /// Run the TCP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let listener = self.bind().await?;
        info!(
            "Ready - listening on {} (line-delimited JSON-RPC over TCP)",
            self.address()
        );
        Self::accept_loop(listener, server).await
    }

    /// Accept connections forever, serving each on its own task.
    pub async fn accept_loop(listener: TcpListener, server: McpServer) -> TransportResult<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("Accepted connection from {}", peer_addr);

                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
                    }

                    let server = server.clone();
                    tokio::spawn(async move {
                        Self::handle_connection(server, stream, peer_addr).await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    // Small delay to avoid spinning on persistent errors
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Handle a single TCP connection.
    async fn handle_connection(
        server: McpServer,
        stream: TcpStream,
        peer_addr: std::net::SocketAddr,
    ) {
        let (reader, writer) = stream.into_split();

        match serve_lines(server, reader, writer).await {
            Ok(()) => info!("Client {} disconnected cleanly", peer_addr),
            Err(e) => warn!("Error while serving client {}: {}", peer_addr, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    #[tokio::test]
    async fn test_tcp_session_serves_line_protocol() {
        let transport = TcpTransport::new(TcpConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        });
        let listener = transport.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = McpServer::new(Config::default());
        tokio::spawn(TcpTransport::accept_loop(listener, server));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(b"garbage\n{\"id\":1,\"method\":\"initialize\"}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(reader).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let response: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(response["id"], 1);
        assert!(response["result"]["serverInfo"].is_object());
    }
}
