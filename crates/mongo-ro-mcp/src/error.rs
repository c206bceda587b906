//! Error types for the MCP crate.

use crate::backend::BackendError;
use thiserror::Error;

/// Errors that can occur in the MCP server.
///
/// Everything below the transport is caught at the dispatcher boundary and
/// rendered as an `isError` tool result; only startup and transport
/// failures ever escape [`crate::McpServer::run`].
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("Unknown tool: {name}")]
    ToolNotFound { name: String },

    /// A tool with this name is already registered.
    #[error("tool {name} is already registered")]
    DuplicateTool { name: String },

    /// Invalid arguments for tool.
    #[error("Invalid arguments for tool {tool}: {field}: {reason}")]
    InvalidArguments {
        tool: String,
        field: String,
        reason: String,
    },

    /// The connect attempt failed. A later call retries.
    #[error("Failed to connect to MongoDB: {0}")]
    ConnectionFailed(#[source] BackendError),

    /// The database rejected or failed the operation.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] BackendError),

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl McpError {
    pub(crate) fn invalid_arguments(
        tool: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        McpError::InvalidArguments {
            tool: tool.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
