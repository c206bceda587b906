//! Argument validation for tool calls.
//!
//! Each tool declares a JSON Schema for its arguments. The whole schema is
//! checked first; when it fails, the declared properties are checked one by
//! one so the error can name the offending field.

use crate::error::McpError;
use jsonschema::Validator;
use serde_json::Value;

/// Compiled validator for one tool's `inputSchema`.
pub struct ArgumentValidator {
    tool: String,
    schema: Validator,
    required: Vec<String>,
    properties: Vec<(String, Validator)>,
}

impl ArgumentValidator {
    /// Compile `schema`. A schema that does not compile is a startup error.
    pub fn new(tool: impl Into<String>, schema: &Value) -> Result<Self, McpError> {
        let tool = tool.into();
        let compile = |schema: &Value| {
            jsonschema::draft202012::options()
                .build(schema)
                .map_err(|e| {
                    McpError::StartupFailed(format!("invalid input schema for tool {}: {}", tool, e))
                })
        };

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut properties = Vec::new();
        if let Some(declared) = schema.get("properties").and_then(Value::as_object) {
            for (name, property_schema) in declared {
                properties.push((name.clone(), compile(property_schema)?));
            }
        }

        Ok(Self {
            schema: compile(schema)?,
            tool,
            required,
            properties,
        })
    }

    /// Validate `arguments`, reporting the first offending field.
    pub fn validate(&self, arguments: &Value) -> Result<(), McpError> {
        if self.schema.is_valid(arguments) {
            return Ok(());
        }

        let Some(object) = arguments.as_object() else {
            return Err(self.invalid("arguments", "expected an object"));
        };

        if let Some(missing) = self.required.iter().find(|name| !object.contains_key(*name)) {
            return Err(self.invalid(missing, "required field is missing"));
        }

        for (name, validator) in &self.properties {
            if let Some(value) = object.get(name)
                && let Some(error) = validator.iter_errors(value).next()
            {
                return Err(self.invalid(name, error.to_string()));
            }
        }

        let reason = self
            .schema
            .iter_errors(arguments)
            .next()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "does not match the input schema".to_string());
        Err(self.invalid("arguments", reason))
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> McpError {
        McpError::invalid_arguments(&self.tool, field, reason)
    }
}
