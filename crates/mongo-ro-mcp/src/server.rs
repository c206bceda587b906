//! MCP server implementation.
//!
//! This module provides the main MCP server: JSON-RPC method handling and
//! the stdio transport loop. The HTTP transport lives in
//! [`crate::http_transport`].

use crate::backend::Connector;
use crate::builtin::builtin_registry;
use crate::context::ServerContext;
use crate::envelope;
use crate::error::McpError;
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use mongo_ro_core::{McpConfig, Transport};
use futures::stream::{self, Stream, StreamExt};
use serde_json::{Value, json};
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    context: ServerContext,
}

impl McpServer {
    /// Create a server from its parts.
    pub fn new(config: McpConfig, tools: ToolRegistry, context: ServerContext) -> Self {
        Self {
            config,
            tools,
            context,
        }
    }

    /// Create a server with the built-in tools, connecting through `connector`.
    pub fn with_connector(
        config: McpConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, McpError> {
        let tools = builtin_registry()?;
        tracing::info!(tool_count = tools.len(), "Registered tools");
        Ok(Self::new(config, tools, ServerContext::new(connector)))
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self: Arc<Self>) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    async fn run_stdio(self: Arc<Self>) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");
        let lines = stdin_lines()?;
        self.serve_stream(lines, tokio::io::stdout()).await
    }

    /// Run the server with HTTP transport.
    async fn run_http(self: Arc<Self>) -> Result<(), McpError> {
        let address = self.config.bind_address();
        HttpServer::new(address, self).run().await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`.
    ///
    /// Each request runs on its own task, so responses are written in
    /// completion order. Returns once input is exhausted and every in-flight
    /// request has been answered.
    pub async fn serve_lines<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let lines = stream::unfold(reader.lines(), |mut lines| async move {
            lines.next_line().await.transpose().map(|line| (line, lines))
        });
        self.serve_stream(lines, writer).await
    }

    async fn serve_stream<S, W>(self: Arc<Self>, lines: S, mut writer: W) -> Result<(), McpError>
    where
        S: Stream<Item = io::Result<String>>,
        W: AsyncWrite + Unpin,
    {
        let (response_tx, mut response_rx) = mpsc::channel::<JsonRpcResponse>(64);
        let mut response_tx = Some(response_tx);
        let mut lines = std::pin::pin!(lines);

        loop {
            tokio::select! {
                line = lines.next(), if response_tx.is_some() => {
                    match line.transpose()? {
                        Some(line) => {
                            if let Some(tx) = &response_tx {
                                Self::spawn_line(&self, line, tx.clone());
                            }
                        }
                        None => {
                            tracing::info!("Input closed, draining in-flight requests");
                            response_tx = None;
                        }
                    }
                }
                Some(response) = response_rx.recv() => {
                    let mut payload = serde_json::to_vec(&response)?;
                    payload.push(b'\n');
                    writer.write_all(&payload).await?;
                    writer.flush().await?;
                }
                else => break,
            }
        }

        Ok(())
    }

    fn spawn_line(server: &Arc<Self>, line: String, responses: mpsc::Sender<JsonRpcResponse>) {
        if line.trim().is_empty() {
            return;
        }

        let server = Arc::clone(server);
        tokio::spawn(async move {
            let response = match serde_json::from_str::<Value>(&line) {
                Ok(message) => server.handle_message(message).await,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to parse JSON-RPC message");
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response
                && responses.send(response).await.is_err()
            {
                tracing::debug!("Response dropped, output closed");
            }
        });
    }

    /// Handle one well-formed JSON value that should be a request.
    async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned().filter(|id| !id.is_null());
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed JSON-RPC request");
                Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        }
    }

    /// Handle a JSON-RPC request.
    ///
    /// Returns `None` for notifications, which must not be answered.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let notification = request.is_notification();

        if request.jsonrpc != JSONRPC_VERSION {
            tracing::warn!(version = %request.jsonrpc, "Unsupported JSON-RPC version");
            let response = JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported JSON-RPC version: {}", request.jsonrpc),
            );
            return if notification { None } else { Some(response) };
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            method if method.starts_with("notifications/") => {
                tracing::debug!(method = %method, "Notification received");
                return None;
            }
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        if notification { None } else { Some(response) }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    );
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let response = self.call_tool(params).await;
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    /// Run one tool call and wrap the outcome in an envelope.
    ///
    /// Never fails: every error becomes an `isError` response.
    pub async fn call_tool(&self, params: CallToolParams) -> CallToolResponse {
        let CallToolParams { name, arguments } = params;
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!("tool_call", tool = %name, %invocation_id);

        async {
            let outcome = self.tools.dispatch(&self.context, &name, arguments).await;
            envelope::build(outcome)
        }
        .instrument(span)
        .await
    }
}

/// Read stdin line by line on a detached thread.
///
/// A blocking stdin read cannot be cancelled, so it must not run on the
/// runtime's blocking pool: shutting the runtime down would wait for it.
fn stdin_lines() -> Result<impl Stream<Item = io::Result<String>>, McpError> {
    let (tx, rx) = mpsc::channel::<io::Result<String>>(64);

    std::thread::Builder::new()
        .name("mongo-ro-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;

    Ok(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}
