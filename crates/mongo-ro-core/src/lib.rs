//! Core types shared by the mongo-ro crates.
//!
//! Right now this is only configuration: the MCP transport settings and
//! the upstream MongoDB settings, loaded from an optional YAML file.

// Configuration types shared across all mongo-ro crates
pub mod config;

pub use config::{
    AppConfig, ConfigError, DEFAULT_URI_ENV, McpConfig, ReadPreferenceMode, Transport,
    UpstreamConfig,
};
