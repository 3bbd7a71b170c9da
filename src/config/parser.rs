use crate::config::types::{Config, Overrides};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file must be complete on its own: it is validated before being
/// returned. Use [`resolve_config`] when command-line flags fill the gaps.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses TOML configuration text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Builds the effective configuration for a run
///
/// Starts from the config file when one is given (defaults otherwise),
/// layers the command-line overrides on top, then validates the result.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            tracing::debug!("Reading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    config.apply(overrides);
    validate(&config)?;

    Ok(config)
}
