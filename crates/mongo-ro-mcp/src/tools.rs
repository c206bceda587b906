//! Tool registry and dispatcher.
//!
//! Tools are registered once at startup, keyed by name. Dispatch resolves
//! the name, validates the arguments against the tool's declared schema and
//! only then runs the handler.

use crate::context::ServerContext;
use crate::error::McpError;
use crate::protocol::ToolDefinition;
use crate::validator::ArgumentValidator;
use async_trait::async_trait;
use mongo_ro_policy::PolicyViolation;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The raw result, serialized into the response text.
    Completed(Value),
    /// The call was refused by policy before reaching the database.
    Refused(PolicyViolation),
}

/// A callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name, description and input schema.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. `arguments` has already passed schema validation.
    async fn call(&self, ctx: &ServerContext, arguments: Value) -> Result<ToolOutcome, McpError>;
}

struct RegisteredTool {
    definition: ToolDefinition,
    validator: ArgumentValidator,
    handler: Arc<dyn ToolHandler>,
}

/// Registry of available MCP tools, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails if the name is taken or the tool's input schema does not compile.
    pub fn register<H>(&mut self, handler: H) -> Result<(), McpError>
    where
        H: ToolHandler + 'static,
    {
        let definition = handler.definition();
        if self.index.contains_key(&definition.name) {
            return Err(McpError::DuplicateTool {
                name: definition.name,
            });
        }

        let validator = ArgumentValidator::new(&definition.name, &definition.input_schema)?;
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            validator,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// List all tools.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|tool| &tool.definition).collect()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|tool| tool.definition.name.as_str())
            .collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve, validate and run one invocation.
    ///
    /// The handler's result is returned unchanged; turning it into a
    /// response is the caller's job.
    pub async fn dispatch(
        &self,
        ctx: &ServerContext,
        name: &str,
        arguments: Value,
    ) -> Result<ToolOutcome, McpError> {
        let tool = self.lookup(name).ok_or_else(|| McpError::ToolNotFound {
            name: name.to_string(),
        })?;

        // Clients may omit `arguments` for tools that take none.
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        tool.validator.validate(&arguments)?;

        tracing::debug!(tool = %name, "Dispatching tool call");
        tool.handler.call(ctx, arguments).await
    }

    fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).and_then(|&i| self.tools.get(i))
    }
}
