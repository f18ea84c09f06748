//! Server lifecycle: the HTTP/SSE listener and, in stdio mode, the line
//! protocol loop.
//!
//! Both transports share [`handle_message`]. They differ only in how errors
//! are wrapped: HTTP replies carry a plain message and a status code, stdio
//! replies carry the structured envelope. Every stdio reply is also broadcast
//! to connected SSE clients.
//!
//! stdio requests are handled concurrently. Replies are written and broadcast
//! one at a time in completion order, so a reply may overtake the reply to an
//! earlier, slower request.
//!
//! The process ends on SIGINT/SIGTERM (Ctrl+C on Windows), when the HTTP
//! server fails, or when stdin reaches EOF in stdio mode.

use std::future::IntoFuture;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use crate::error::DispatchError;
use crate::mcp::clients::ClientRegistry;
use crate::mcp::http::{self, AppState};
use crate::mcp::protocol::{parse_message, IncomingMessage, OutgoingMessage};
use crate::mcp::tools::{tool_definitions, ToolDispatcher};
use crate::mcp::transport::StdioTransport;

/// Handles one parsed message.
///
/// # Errors
///
/// Returns the dispatcher's error for failed tool calls.
pub async fn handle_message(
    dispatcher: &ToolDispatcher,
    message: IncomingMessage,
) -> Result<OutgoingMessage, DispatchError> {
    match message {
        IncomingMessage::Ping => Ok(OutgoingMessage::Pong),
        IncomingMessage::GetTools => Ok(OutgoingMessage::Tools {
            tools: tool_definitions(),
        }),
        IncomingMessage::ExecuteTool(call) => {
            let result = dispatcher.execute(&call.tool, &call.params).await?;
            Ok(OutgoingMessage::ToolResult {
                id: call.id,
                result,
            })
        }
    }
}

/// Parses and handles one line of the stdio protocol.
///
/// Never fails: errors become the structured error envelope.
pub async fn respond_line(dispatcher: &ToolDispatcher, line: &str) -> OutgoingMessage {
    let result = match parse_message(line) {
        Ok(message) => handle_message(dispatcher, message).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(code = e.code(), error = %e, "stdio request failed");
        OutgoingMessage::error_envelope(&e)
    })
}

/// The sketch-context MCP server.
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
    clients: ClientRegistry,
    port: u16,
    stdio: bool,
}

impl McpServer {
    /// Creates a server listening on `port`, optionally also reading stdin.
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher, port: u16, stdio: bool) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            clients: ClientRegistry::new(),
            port,
            stdio,
        }
    }

    /// The registry of connected SSE clients.
    #[must_use]
    pub const fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// Binds the configured port and runs until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or transport I/O fails.
    pub async fn run(self) -> io::Result<()> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Runs on an already-bound listener until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server or stdio I/O fails.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let port = listener.local_addr()?.port();
        tracing::info!(port, stdio = self.stdio, "HTTP/SSE server listening");

        let app = http::router(AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            clients: self.clients.clone(),
            port,
        });
        let server = axum::serve(listener, app).into_future();

        if self.stdio {
            tokio::select! {
                result = server => result,
                result = run_stdio(&self.dispatcher, &self.clients) => result,
                result = shutdown_signal() => result,
            }
        } else {
            tokio::select! {
                result = server => result,
                result = shutdown_signal() => result,
            }
        }
    }
}

async fn run_stdio(dispatcher: &ToolDispatcher, clients: &ClientRegistry) -> io::Result<()> {
    serve_lines(StdioTransport::new(), dispatcher, clients).await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Runs the line protocol over `transport` until its input reaches EOF.
///
/// Requests already in flight at EOF are still answered before returning.
///
/// # Errors
///
/// Returns an error if reading or writing the transport fails.
pub async fn serve_lines<R, W>(
    mut transport: StdioTransport<R, W>,
    dispatcher: &ToolDispatcher,
    clients: &ClientRegistry,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut pending = FuturesUnordered::new();
    let mut reading = true;

    while reading || !pending.is_empty() {
        tokio::select! {
            line = transport.read_line(), if reading => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => pending.push(async move { respond_line(dispatcher, &line).await }),
                None => {
                    tracing::debug!(in_flight = pending.len(), "Input closed");
                    reading = false;
                }
            },
            Some(reply) = pending.next(), if !pending.is_empty() => {
                transport.write_message(&reply).await?;

                let delivered = clients.broadcast(&reply);
                tracing::debug!(delivered, "Broadcast stdio reply");
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
    Ok(())
}

#[cfg(windows)]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use serde_json::json;

    use super::*;
    use crate::acquire::{AcquireSettings, Acquirer};

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(Acquirer::new(AcquireSettings::default()).unwrap())
    }

    #[tokio::test]
    async fn ping_pongs() {
        let reply = handle_message(&dispatcher(), IncomingMessage::Ping)
            .await
            .unwrap();
        assert!(matches!(reply, OutgoingMessage::Pong));
    }

    #[tokio::test]
    async fn get_tools_lists_catalog() {
        let reply = handle_message(&dispatcher(), IncomingMessage::GetTools)
            .await
            .unwrap();
        let value = serde_json::to_value(reply).unwrap();
        assert_eq!(value["type"], "tools");
        assert_eq!(value["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn stdio_unknown_tool_gets_envelope() {
        let line = r#"{"type":"execute_tool","tool":"nope","params":{}}"#;
        let value = serde_json::to_value(respond_line(&dispatcher(), line).await).unwrap();

        assert_eq!(value["type"], "error");
        assert_eq!(value["error"]["message"], "Unknown tool: nope");
        assert_eq!(value["error"]["code"], "UNKNOWN_TOOL");
        assert_eq!(value["error"]["details"], json!({ "tool": "nope" }));
    }

    #[tokio::test]
    async fn stdio_missing_local_file_gets_envelope() {
        let line = r#"{"type":"execute_tool","tool":"get_file","params":{"url":"relative.sketch"}}"#;
        let value = serde_json::to_value(respond_line(&dispatcher(), line).await).unwrap();

        assert_eq!(value["error"]["code"], "MISSING_LOCAL_FILE");
        assert!(value["error"]["suggestion"].is_string());
    }

    async fn serve(input: &str, clients: &ClientRegistry) -> Vec<serde_json::Value> {
        let (output, mut peer) = tokio::io::duplex(64 * 1024);
        let transport = StdioTransport::with_io(input.as_bytes(), output);
        serve_lines(transport, &dispatcher(), clients).await.unwrap();

        let mut written = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut peer, &mut written)
            .await
            .unwrap();
        written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn lines_are_answered_and_broadcast() {
        let clients = ClientRegistry::new();
        let mut subscriber = clients.subscribe();
        assert_eq!(
            subscriber.next().await.unwrap(),
            r#"{"type":"connection_success"}"#
        );

        let replies = serve("{\"type\":\"ping\"}\n\n   \r\n{oops\n", &clients).await;
        assert_eq!(replies.len(), 2);

        let mut types: Vec<_> = replies.iter().map(|r| r["type"].clone()).collect();
        types.sort_by_key(ToString::to_string);
        assert_eq!(types, [json!("error"), json!("pong")]);

        let mut broadcast = Vec::new();
        while let Some(Some(event)) = subscriber.next().now_or_never() {
            broadcast.push(serde_json::from_str::<serde_json::Value>(&event).unwrap());
        }
        assert_eq!(broadcast, replies);
    }

    #[tokio::test]
    async fn stalled_request_does_not_hold_back_ping() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        // Accepts connections into the backlog but never answers them.
        let stalled = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let acquirer = Acquirer::new(AcquireSettings {
            api_key: Some("key".into()),
            api_base_url: format!("http://{}", stalled.local_addr().unwrap()),
            ..AcquireSettings::default()
        })
        .unwrap();
        let dispatcher = ToolDispatcher::new(acquirer);

        let (mut input, server_in) = tokio::io::duplex(1024);
        let (server_out, output) = tokio::io::duplex(1024);
        let transport = StdioTransport::with_io(server_in, server_out);
        let clients = ClientRegistry::new();

        input
            .write_all(
                concat!(
                    r#"{"type":"execute_tool","tool":"get_file","params":{"url":"https://www.sketch.cloud/s/abc"}}"#,
                    "\n",
                    r#"{"type":"ping"}"#,
                    "\n",
                )
                .as_bytes(),
            )
            .await
            .unwrap();

        let mut replies = BufReader::new(output).lines();
        let first = tokio::select! {
            result = serve_lines(transport, &dispatcher, &clients) => panic!("serve ended early: {result:?}"),
            line = replies.next_line() => line.unwrap().unwrap(),
        };
        assert_eq!(first, r#"{"type":"pong"}"#);
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        assert!(serve("", &ClientRegistry::new()).await.is_empty());
    }

    #[tokio::test]
    async fn stdio_garbage_gets_envelope() {
        let reply = respond_line(&dispatcher(), "{not json").await;
        let value = serde_json::to_value(reply).unwrap();
        assert_eq!(value["error"]["code"], "INVALID_MESSAGE");
    }
}
