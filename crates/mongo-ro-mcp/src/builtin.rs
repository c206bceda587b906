//! The read-only MongoDB tools.
//!
//! | Tool | Arguments | Result |
//! |------|-----------|--------|
//! | `list_databases` | none | database metadata from `listDatabases` |
//! | `list_collections` | `database` | collection names, in server order |
//! | `run_aggregation` | `database`, `collection`, `pipeline` | every result document |
//!
//! `run_aggregation` checks the pipeline against the read-only policy before
//! it asks for a connection, so a refused pipeline never reaches the server.

use crate::context::ServerContext;
use crate::error::McpError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::tools::{ToolHandler, ToolOutcome, ToolRegistry};
use async_trait::async_trait;
use mongo_ro_policy::Pipeline;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub const LIST_DATABASES: &str = "list_databases";
pub const LIST_COLLECTIONS: &str = "list_collections";
pub const RUN_AGGREGATION: &str = "run_aggregation";

/// Registry holding the three built-in tools.
pub fn builtin_registry() -> Result<ToolRegistry, McpError> {
    let mut registry = ToolRegistry::new();
    registry.register(ListDatabasesTool)?;
    registry.register(ListCollectionsTool)?;
    registry.register(RunAggregationTool)?;
    Ok(registry)
}

/// Deserialize already-validated arguments into the tool's argument type.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments)
        .map_err(|e| McpError::invalid_arguments(tool, "arguments", e.to_string()))
}

fn database_property() -> Value {
    json!({ "type": "string", "minLength": 1, "description": "The database name" })
}

/// `list_databases`
pub struct ListDatabasesTool;

#[async_trait]
impl ToolHandler for ListDatabasesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: LIST_DATABASES.to_string(),
            description: Some("List all databases on the connected MongoDB instance".to_string()),
            input_schema: json!({ "type": "object", "properties": {} }),
            annotations: Some(ToolAnnotations::read_only("List databases")),
        }
    }

    async fn call(&self, ctx: &ServerContext, _arguments: Value) -> Result<ToolOutcome, McpError> {
        let handle = ctx.connections().ensure_connected().await?;
        let databases = handle
            .list_databases()
            .await
            .map_err(McpError::QueryFailed)?;

        tracing::debug!(count = databases.len(), "Listed databases");
        Ok(ToolOutcome::Completed(Value::Array(databases)))
    }
}

#[derive(Debug, Deserialize)]
struct ListCollectionsArgs {
    database: String,
}

/// `list_collections`
pub struct ListCollectionsTool;

#[async_trait]
impl ToolHandler for ListCollectionsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: LIST_COLLECTIONS.to_string(),
            description: Some("List all collections in a given database".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": { "database": database_property() },
                "required": ["database"]
            }),
            annotations: Some(ToolAnnotations::read_only("List collections")),
        }
    }

    async fn call(&self, ctx: &ServerContext, arguments: Value) -> Result<ToolOutcome, McpError> {
        let args: ListCollectionsArgs = parse_args(LIST_COLLECTIONS, arguments)?;

        let handle = ctx.connections().ensure_connected().await?;
        let collections = handle
            .list_collections(&args.database)
            .await
            .map_err(McpError::QueryFailed)?;

        let names: Vec<Value> = collections
            .into_iter()
            .map(|collection| Value::String(collection.name))
            .collect();

        tracing::debug!(database = %args.database, count = names.len(), "Listed collections");
        Ok(ToolOutcome::Completed(Value::Array(names)))
    }
}

#[derive(Debug, Deserialize)]
struct RunAggregationArgs {
    database: String,
    collection: String,
    pipeline: Pipeline,
}

/// `run_aggregation`
pub struct RunAggregationTool;

#[async_trait]
impl ToolHandler for RunAggregationTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: RUN_AGGREGATION.to_string(),
            description: Some("Run an aggregation pipeline on a collection".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "database": database_property(),
                    "collection": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The collection name"
                    },
                    "pipeline": {
                        "type": "array",
                        "items": { "type": "object" },
                        "description": "The aggregation pipeline stages"
                    }
                },
                "required": ["database", "collection", "pipeline"]
            }),
            annotations: Some(ToolAnnotations::read_only("Run aggregation")),
        }
    }

    async fn call(&self, ctx: &ServerContext, arguments: Value) -> Result<ToolOutcome, McpError> {
        let args: RunAggregationArgs = parse_args(RUN_AGGREGATION, arguments)?;

        if let Err(violation) = ctx.policy().check(&args.pipeline) {
            return Ok(ToolOutcome::Refused(violation));
        }

        tracing::debug!(
            database = %args.database,
            collection = %args.collection,
            stages = args.pipeline.len(),
            "Running aggregation"
        );

        let handle = ctx.connections().ensure_connected().await?;
        let documents = handle
            .aggregate(&args.database, &args.collection, args.pipeline)
            .await
            .map_err(McpError::QueryFailed)?;

        Ok(ToolOutcome::Completed(Value::Array(documents)))
    }
}
