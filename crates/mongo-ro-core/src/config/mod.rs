//! Configuration types for mongo-ro.
//!
//! Configuration is loaded from an optional YAML file (`mongo-ro.yaml` by
//! default). Every field has a default, so an empty file is a valid config.
//!
//! The connection string is deliberately absent from the file: it is only
//! ever read from the environment variable named by `upstream.uri_env`.
//!
//! ```yaml
//! mcp:
//!   transport: http
//!   port: 3000
//! upstream:
//!   uri_env: MONGODB_URI
//!   read_preference: secondary_preferred
//! ```

pub mod mcp;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use mcp::{McpConfig, Transport};
pub use upstream::{DEFAULT_URI_ENV, ReadPreferenceMode, UpstreamConfig};

/// Complete mongo-ro configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// MCP server configuration.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Upstream MongoDB settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The connection string variable is unset or empty.
    #[error("{env} environment variable is required")]
    MissingUri { env: String },
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    ///
    /// An empty document yields the default configuration.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}
