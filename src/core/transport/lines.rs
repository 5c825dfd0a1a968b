//! Line-delimited JSON-RPC loop shared by the STDIO and TCP transports.
//!
//! Input is read as raw bytes and split on `\n`. Blank lines are dropped;
//! lines that are not a JSON object are logged and dropped without a
//! response, since no request id can be recovered from them. Every request
//! runs on its own task and its response is written as a single line once it
//! completes, so responses follow completion order rather than arrival order.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::{TransportError, TransportResult};
use crate::core::McpServer;
use crate::core::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Maximum number of responses waiting for the writer.
///
/// The reader stops taking new requests while this many responses are
/// pending, so a client that stops reading output stalls its own input
/// instead of growing memory.
const RESPONSE_BUFFER: usize = 64;

/// Serve requests read from `reader` until it reaches end of input.
///
/// Returns once every in-flight request has been answered and the responses
/// have been flushed to `writer`.
pub async fn serve_lines<R, W>(server: McpServer, reader: R, writer: W) -> TransportResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            debug!("End of input");
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(request) = parse_line(line) else {
            continue;
        };

        let Ok(permit) = tx.clone().reserve_owned().await else {
            warn!("Output closed, no longer reading requests");
            break;
        };

        let id = request.id.clone();
        let is_notification = request.is_notification();
        let server = server.clone();
        spawn_handled(
            async move { server.handle_request(request).await },
            id,
            is_notification,
            permit,
        );
    }

    // The writer drains until the last in-flight request releases its permit.
    drop(tx);
    writer_task
        .await
        .map_err(|e| TransportError::service(e.to_string()))?
}

/// Parse one input line, logging and discarding anything unusable.
fn parse_line(line: &str) -> Option<JsonRpcRequest> {
    let value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding malformed input line: {}", e);
            return None;
        }
    };

    let request = JsonRpcRequest::from_value(value);
    if request.is_none() {
        warn!("Discarding input line that is not a JSON object");
    }
    request
}

/// Run a request handler on its own task and queue its response.
///
/// The handler runs in a nested task so that a panic inside it still
/// produces an internal-error response carrying the request id.
fn spawn_handled<F>(
    handler: F,
    id: Option<Value>,
    is_notification: bool,
    permit: mpsc::OwnedPermit<JsonRpcResponse>,
) where
    F: Future<Output = Option<JsonRpcResponse>> + Send + 'static,
{
    tokio::spawn(async move {
        let response = match tokio::spawn(handler).await {
            Ok(response) => response,
            Err(e) => {
                error!("Request handler failed: {}", e);
                (!is_notification).then(|| JsonRpcResponse::internal_error(id, e.to_string()))
            }
        };

        // Dropping an unused permit returns its slot to the channel.
        if let Some(response) = response {
            permit.send(response);
        }
    });
}

async fn write_responses<W>(
    writer: W,
    mut rx: mpsc::Receiver<JsonRpcResponse>,
) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(writer);

    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::config::ResourcesConfig;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn core_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("00_CORE")).unwrap();
        fs::write(temp.path().join("00_CORE/INDEX.md"), "hello").unwrap();
        temp
    }

    fn server_for(root: &std::path::Path) -> McpServer {
        let mut config = Config::default();
        config.resources = ResourcesConfig::with_root(root);
        McpServer::new(config)
    }

    /// Feed `chunks` as successive reads and collect every output line.
    async fn run(server: McpServer, chunks: &[&[u8]]) -> Vec<Value> {
        let mut builder = tokio_test::io::Builder::new();
        for chunk in chunks {
            builder.read(chunk);
        }
        let input = builder.build();
        let (mut client, output) = tokio::io::duplex(64 * 1024);

        serve_lines(server, input, output).await.unwrap();

        let mut raw = String::new();
        client.read_to_string(&mut raw).await.unwrap();
        assert!(raw.is_empty() || raw.ends_with('\n'));
        raw.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn by_id(responses: Vec<Value>) -> HashMap<String, Value> {
        responses
            .into_iter()
            .map(|response| (response["id"].to_string(), response))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_list_and_read() {
        let temp = core_root();
        let input: &[&[u8]] = &[
            b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"resources/list\"}\n",
            b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"resources/read\",\"params\":{\"uri\":\"tsunami://context/00_CORE/INDEX.md\"}}\n",
        ];

        let responses = by_id(run(server_for(temp.path()), input).await);

        assert_eq!(responses.len(), 2);
        assert_eq!(
            responses["1"]["result"]["resources"][0]["uri"],
            "tsunami://context/00_CORE/INDEX.md"
        );
        assert_eq!(
            responses["2"],
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": {"contents": [{
                    "uri": "tsunami://context/00_CORE/INDEX.md",
                    "mimeType": "text/markdown",
                    "text": "hello"
                }]}
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped() {
        let temp = core_root();
        let input: &[&[u8]] = &[
            b"this is not json\n",
            b"[1, 2, 3]\n",
            b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n",
        ];

        let responses = run(server_for(temp.path()), input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 1);
        assert!(responses[0]["result"]["protocolVersion"].is_string());
    }

    #[tokio::test]
    async fn test_blank_lines_and_crlf() {
        let temp = core_root();
        let input: &[&[u8]] = &[b"\n   \n\r\n{\"id\":4,\"method\":\"foo\"}\r\n\n"];

        let responses = run(server_for(temp.path()), input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_request_split_across_reads() {
        let temp = core_root();
        let input: &[&[u8]] = &[
            b"{\"id\":3,\"method\":\"resources/re",
            b"ad\",\"params\":{\"uri\":\"tsunami://context/missing/x.md\"}}\n{\"id\":",
            b"4,\"method\":\"initialize\"}\n",
        ];

        let responses = by_id(run(server_for(temp.path()), input).await);

        assert_eq!(
            responses["3"],
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "error": {"code": -32602, "message": "Resource not found"}
            })
        );
        assert!(responses["4"]["result"].is_object());
    }

    #[tokio::test]
    async fn test_final_line_without_newline_is_served() {
        let temp = core_root();
        let input: &[&[u8]] = &[b"{\"id\":9,\"method\":\"resources/list\"}"];

        let responses = run(server_for(temp.path()), input).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 9);
    }

    #[tokio::test]
    async fn test_notifications_produce_no_output() {
        let temp = core_root();
        let input: &[&[u8]] = &[
            b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        ];

        let responses = run(server_for(temp.path()), input).await;

        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_exits_cleanly() {
        let temp = core_root();
        let responses = run(server_for(temp.path()), &[]).await;
        assert!(responses.is_empty());
    }

    async fn exploding_handler() -> Option<JsonRpcResponse> {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn test_panicking_handler_answers_internal_error() {
        let (tx, mut rx) = mpsc::channel(4);

        let permit = tx.clone().reserve_owned().await.unwrap();
        spawn_handled(exploding_handler(), Some(json!(7)), false, permit);

        let response = serde_json::to_value(rx.recv().await.unwrap()).unwrap();
        assert_eq!(response["id"], 7);
        assert_eq!(response["error"]["code"], -32603);
        assert!(response.get("result").is_none());

        // The same channel keeps serving the next request.
        let permit = tx.clone().reserve_owned().await.unwrap();
        spawn_handled(
            async { Some(JsonRpcResponse::success(Some(json!(8)), json!({}))) },
            Some(json!(8)),
            false,
            permit,
        );
        let response = rx.recv().await.unwrap();
        assert_eq!(response.id, Some(json!(8)));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_panicking_notification_stays_silent() {
        let (tx, mut rx) = mpsc::channel(1);

        let permit = tx.reserve_owned().await.unwrap();
        spawn_handled(exploding_handler(), None, true, permit);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_more_requests_than_response_buffer() {
        let temp = core_root();
        let mut input = Vec::new();
        for id in 0..(RESPONSE_BUFFER * 2) {
            input.extend_from_slice(
                format!("{{\"id\":{id},\"method\":\"resources/list\"}}\n").as_bytes(),
            );
        }

        let responses = by_id(run(server_for(temp.path()), &[input.as_slice()]).await);

        assert_eq!(responses.len(), RESPONSE_BUFFER * 2);
        assert_eq!(responses["0"]["result"]["resources"][0]["name"], "INDEX");
    }
}
