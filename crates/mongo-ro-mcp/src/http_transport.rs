//! HTTP transport for MCP server.
//!
//! One JSON-RPC message per `POST /mcp`. Requests are handled directly on
//! the axum task, so concurrent HTTP calls are concurrent tool calls.

use crate::error::McpError;
use crate::protocol::JsonRpcRequest;
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    match server.handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        // Notifications carry no response body.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": crate::protocol::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    server: Arc<McpServer>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(address: impl Into<String>, server: Arc<McpServer>) -> Self {
        Self {
            address: address.into(),
            server,
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to {}: {}", self.address, e))
            })?;

        tracing::info!(address = %self.address, "MCP HTTP server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?;

        Ok(())
    }
}
