//! Configuration module for Proxy-Fanout
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and layering command-line overrides on top of it.
//!
//! # Example
//!
//! ```no_run
//! use proxy_fanout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fanout.toml")).unwrap();
//! println!("Pool will run {} workers", config.pool.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, Overrides, PoolConfig, ProxiesConfig, TargetConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, resolve_config};
pub use validation::validate;
