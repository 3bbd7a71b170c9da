//! Proxy-Fanout: bulk form submission through a pool of forward proxies
//!
//! This crate spreads a fixed-size pool of workers across a list of proxy
//! endpoints, submits one HTTP form through each of them, optionally records
//! which proxies worked, and shuts the pool down in a strict two-phase order.

pub mod action;
pub mod config;
pub mod endpoint;
pub mod observe;
pub mod output;
pub mod pool;
pub mod source;

use thiserror::Error;

/// Main error type for Proxy-Fanout operations
///
/// Only pre-run failures surface here. Everything that happens once the pool
/// is running is reported through the observer and never aborts the run.
#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Proxy source error: {0}")]
    Source(#[from] SourceError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while loading the proxy list
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read proxy list {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse proxy list {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Start offset {offset} is beyond the end of the proxy list ({len} entries)")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Errors raised while turning a proxy entry into an endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Failed to parse proxy '{entry}': {reason}")]
    Parse { entry: String, reason: String },

    #[error("Unsupported proxy scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in proxy '{0}'")]
    MissingHost(String),

    #[error("Missing port in proxy '{0}'")]
    MissingPort(String),

    #[error("Proxy '{0}' must not carry a path, query or fragment")]
    Malformed(String),
}

/// Result type alias for Proxy-Fanout operations
pub type Result<T> = std::result::Result<T, FanoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use action::{Action, ActionError, FormSubmission};
pub use config::Config;
pub use endpoint::Endpoint;
pub use observe::{RunObserver, TracingObserver};
pub use output::RunSummary;
pub use pool::{run_from_config, Dispatcher};
