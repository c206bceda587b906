//! Shared test infrastructure for mongo-ro MCP end-to-end tests.
//!
//! This module provides:
//! - An in-memory fake database implementing the backend traits
//! - A server wired to that fake
//! - Helper functions for test assertions

#![allow(dead_code)]

use async_trait::async_trait;
use mongo_ro_core::McpConfig;
use mongo_ro_mcp::{
    BackendError, CallToolParams, CallToolResponse, CollectionInfo, Connector, DatabaseHandle,
    JsonRpcRequest, JsonRpcResponse, McpServer,
};
use mongo_ro_policy::Pipeline;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// FAKE DATABASE
// =============================================================================

/// In-memory stand-in for a MongoDB deployment.
///
/// Counts connect attempts and records every pipeline it is asked to run.
#[derive(Default)]
pub struct FakeDatabase {
    /// database name -> collections, in insertion order
    collections: Mutex<Vec<(String, Vec<(String, Vec<Value>)>)>>,
    connect_calls: AtomicUsize,
    /// Number of upcoming connect attempts that should fail.
    failing_connects: AtomicUsize,
    connect_delay: Mutex<Duration>,
    aggregations: Mutex<Vec<(String, String, Pipeline)>>,
    failing_queries: Mutex<Option<String>>,
}

impl FakeDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert `documents` into `database.collection`, creating both as needed.
    pub fn insert(&self, database: &str, collection: &str, documents: Vec<Value>) {
        let mut databases = self.collections.lock().unwrap();
        let position = match databases.iter().position(|(name, _)| name == database) {
            Some(position) => position,
            None => {
                databases.push((database.to_string(), Vec::new()));
                databases.len() - 1
            }
        };
        let collections = &mut databases[position].1;
        match collections.iter_mut().find(|(name, _)| name == collection) {
            Some((_, existing)) => existing.extend(documents),
            None => collections.push((collection.to_string(), documents)),
        }
    }

    pub fn fail_next_connects(&self, count: usize) {
        self.failing_connects.store(count, Ordering::SeqCst);
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = delay;
    }

    pub fn fail_queries_with(&self, message: &str) {
        *self.failing_queries.lock().unwrap() = Some(message.to_string());
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Every pipeline received, with its target namespace.
    pub fn aggregations(&self) -> Vec<(String, String, Pipeline)> {
        self.aggregations.lock().unwrap().clone()
    }

    fn query_failure(&self) -> Result<(), BackendError> {
        match self.failing_queries.lock().unwrap().as_ref() {
            Some(message) => Err(BackendError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn documents(&self, database: &str, collection: &str) -> Vec<Value> {
        let databases = self.collections.lock().unwrap();
        databases
            .iter()
            .find(|(name, _)| name == database)
            .and_then(|(_, collections)| collections.iter().find(|(name, _)| name == collection))
            .map(|(_, documents)| documents.clone())
            .unwrap_or_default()
    }
}

/// Connects to a shared [`FakeDatabase`].
pub struct FakeConnector {
    pub db: Arc<FakeDatabase>,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn DatabaseHandle>, BackendError> {
        self.db.connect_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.db.connect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .db
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(BackendError::new("connection refused"));
        }

        Ok(Arc::new(FakeHandle {
            db: Arc::clone(&self.db),
        }))
    }
}

pub struct FakeHandle {
    db: Arc<FakeDatabase>,
}

#[async_trait]
impl DatabaseHandle for FakeHandle {
    async fn list_databases(&self) -> Result<Vec<Value>, BackendError> {
        self.db.query_failure()?;
        let databases = self.db.collections.lock().unwrap();
        Ok(databases
            .iter()
            .map(|(name, _)| json!({ "name": name, "sizeOnDisk": 8192, "empty": false }))
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>, BackendError> {
        self.db.query_failure()?;
        let databases = self.db.collections.lock().unwrap();
        Ok(databases
            .iter()
            .find(|(name, _)| name == database)
            .map(|(_, collections)| {
                collections
                    .iter()
                    .map(|(name, _)| CollectionInfo::new(name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Pipeline,
    ) -> Result<Vec<Value>, BackendError> {
        self.db.aggregations.lock().unwrap().push((
            database.to_string(),
            collection.to_string(),
            pipeline.clone(),
        ));
        self.db.query_failure()?;

        // Only top-level equality `$match` is understood; other stages pass through.
        let mut documents = self.db.documents(database, collection);
        for stage in &pipeline {
            if let Some(Value::Object(filter)) = stage.get("$match") {
                documents.retain(|document| matches(document, filter));
            }
        }
        Ok(documents)
    }

    async fn close(&self) {}
}

fn matches(document: &Value, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub server: Arc<McpServer>,
    pub db: Arc<FakeDatabase>,
}

impl TestContext {
    /// A server over an empty fake database.
    pub fn new() -> Self {
        let db = FakeDatabase::new();
        let connector = Arc::new(FakeConnector { db: Arc::clone(&db) });
        let server = McpServer::with_connector(McpConfig::default(), connector)
            .expect("built-in tools must register");
        Self {
            server: Arc::new(server),
            db,
        }
    }

    /// A server over the `shop` fixture.
    pub fn with_shop() -> Self {
        let ctx = Self::new();
        seed_shop(&ctx.db);
        ctx
    }

    pub async fn call(&self, tool: &str, arguments: Value) -> CallToolResponse {
        self.server
            .call_tool(CallToolParams {
                name: tool.to_string(),
                arguments,
            })
            .await
    }

    pub async fn rpc(&self, id: i64, method: &str, params: Value) -> JsonRpcResponse {
        self.server
            .handle_request(JsonRpcRequest::new(Some(json!(id)), method, Some(params)))
            .await
            .expect("requests with an id are answered")
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn seed_shop(db: &FakeDatabase) {
    db.insert(
        "shop",
        "orders",
        vec![
            json!({ "_id": 1, "customer": "ada", "status": "paid", "amount": 40 }),
            json!({ "_id": 2, "customer": "bob", "status": "pending", "amount": 15 }),
            json!({ "_id": 3, "customer": "ada", "status": "paid", "amount": 25 }),
        ],
    );
    db.insert(
        "shop",
        "users",
        vec![
            json!({ "_id": "ada", "name": "Ada" }),
            json!({ "_id": "bob", "name": "Bob" }),
        ],
    );
    db.insert("analytics", "events", vec![json!({ "_id": 1, "kind": "visit" })]);
}

// =============================================================================
// ASSERTIONS
// =============================================================================

pub fn assert_success(response: &CallToolResponse, context: &str) -> Value {
    assert!(
        !response.is_error(),
        "{}: expected success, got {:?}",
        context,
        response.first_text()
    );
    let text = response.first_text().expect("success carries text");
    serde_json::from_str(text).expect("success text is JSON")
}

pub fn assert_failure(response: &CallToolResponse, context: &str) -> String {
    assert!(
        response.is_error(),
        "{}: expected failure, got {:?}",
        context,
        response.first_text()
    );
    assert_eq!(response.content.len(), 1, "{}: exactly one content item", context);
    response
        .first_text()
        .expect("failure carries text")
        .to_string()
}
