//! Database capability traits.
//!
//! The server never talks to a driver directly. It asks a [`Connector`] for a
//! [`DatabaseHandle`] once and routes every tool through that handle. Values
//! crossing this seam are plain `serde_json` so test doubles need no driver
//! types.

use async_trait::async_trait;
use mongo_ro_policy::Pipeline;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by the database layer, with the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Collection metadata as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
}

impl CollectionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Opens connections. Called at most once per successful connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DatabaseHandle>, BackendError>;
}

/// A live connection.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Metadata for every database, from the administrative namespace.
    async fn list_databases(&self) -> Result<Vec<Value>, BackendError>;

    /// Collections of `database`, in the order the server reports them.
    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>, BackendError>;

    /// Run `pipeline` against `database.collection` and collect every document.
    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Pipeline,
    ) -> Result<Vec<Value>, BackendError>;

    /// Release the underlying connection.
    async fn close(&self);
}
