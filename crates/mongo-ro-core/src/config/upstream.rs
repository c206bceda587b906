//! Upstream MongoDB configuration types.
//!
//! The connection string always comes from the process environment. The
//! file only names the variable to read and tunes how the client is built.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable read for the connection string unless overridden.
pub const DEFAULT_URI_ENV: &str = "MONGODB_URI";

/// Configuration for the upstream MongoDB deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Environment variable name containing the MongoDB connection string.
    #[serde(default = "default_uri_env")]
    pub uri_env: String,

    /// Which replica set members reads are routed to.
    #[serde(default)]
    pub read_preference: ReadPreferenceMode,

    /// Application name reported to the server in the connection handshake.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            uri_env: default_uri_env(),
            read_preference: ReadPreferenceMode::default(),
            app_name: default_app_name(),
        }
    }
}

/// Read preference applied to the client.
///
/// Defaults to `secondary_preferred`: every tool is read-only, so stale
/// reads from a secondary are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadPreferenceMode {
    Primary,
    PrimaryPreferred,
    Secondary,
    #[default]
    SecondaryPreferred,
    Nearest,
}

fn default_uri_env() -> String {
    DEFAULT_URI_ENV.to_string()
}

fn default_app_name() -> String {
    "mongo-ro".to_string()
}

impl UpstreamConfig {
    /// Read the connection string from the process environment.
    pub fn resolve_uri(&self) -> Result<String, ConfigError> {
        self.resolve_uri_with(|name| std::env::var(name).ok())
    }

    /// Read the connection string through `lookup`.
    ///
    /// An unset or blank value is reported as [`ConfigError::MissingUri`].
    pub fn resolve_uri_with<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(&self.uri_env) {
            Some(uri) if !uri.trim().is_empty() => Ok(uri),
            _ => Err(ConfigError::MissingUri {
                env: self.uri_env.clone(),
            }),
        }
    }
}
