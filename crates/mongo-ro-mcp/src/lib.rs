//! # mongo-ro-mcp
//!
//! MCP (Model Context Protocol) server that exposes a MongoDB deployment to
//! AI agents through a small set of read-only tools.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  mongo-ro MCP Server │
//! │  1. Resolve tool     │  ← ToolRegistry
//! │  2. Validate args    │  ← jsonschema
//! │  3. Read-only check  │  ← mongo-ro-policy
//! │  4. Connect (once)   │  ← ConnectionManager
//! │  5. Execute          │
//! │  6. Wrap result      │  ← envelope
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   MongoDB (secondary preferred)
//! ```
//!
//! ## Tools
//!
//! | Tool | Arguments |
//! |------|-----------|
//! | `list_databases` | none |
//! | `list_collections` | `database` |
//! | `run_aggregation` | `database`, `collection`, `pipeline` |
//!
//! Pipelines containing `$out` or `$merge` are refused before any
//! connection is made.
//!
//! ## Example Usage
//!
//! ```ignore
//! use mongo_ro_core::{McpConfig, UpstreamConfig};
//! use mongo_ro_mcp::{McpServer, MongoConnector, lifecycle};
//! use std::sync::Arc;
//!
//! let upstream = UpstreamConfig::default();
//! let connector = MongoConnector::new(upstream.resolve_uri()?, upstream);
//! let server = McpServer::with_connector(McpConfig::default(), Arc::new(connector))?;
//!
//! lifecycle::run_until_shutdown(Arc::new(server), lifecycle::interrupt()).await?;
//! ```

pub mod backend;
pub mod builtin;
pub mod connection;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http_transport;
pub mod lifecycle;
pub mod mongo;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod validator;

// Re-export main types
pub use backend::{BackendError, CollectionInfo, Connector, DatabaseHandle};
pub use builtin::builtin_registry;
pub use connection::{ConnectionManager, ConnectionState};
pub use context::ServerContext;
pub use error::McpError;
pub use mongo::MongoConnector;
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tools::{ToolHandler, ToolOutcome, ToolRegistry};
