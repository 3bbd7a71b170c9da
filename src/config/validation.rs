use crate::config::types::{Config, PoolConfig, ProxiesConfig, TargetConfig};
use crate::{ConfigError, ConfigResult};

/// Largest worker pool accepted
const MAX_WORKERS: usize = 10_000;

/// Longest per-request timeout accepted (seconds)
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_target_config(&config.target)?;
    validate_pool_config(&config.pool)?;
    validate_proxies_config(&config.proxies)?;
    Ok(())
}

/// Validates the submission target
fn validate_target_config(config: &TargetConfig) -> ConfigResult<()> {
    if config.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "base-url is required".to_string(),
        ));
    }

    validate_identifier("poll-id", &config.poll_id)?;

    if config.option_id.is_empty() {
        return Err(ConfigError::Validation(
            "option-id is required".to_string(),
        ));
    }

    if config.form_field.is_empty() {
        return Err(ConfigError::Validation(
            "form-field cannot be empty".to_string(),
        ));
    }

    let url = config.submission_url()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates pool sizing
fn validate_pool_config(config: &PoolConfig) -> ConfigResult<()> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates input and output paths
fn validate_proxies_config(config: &ProxiesConfig) -> ConfigResult<()> {
    if config.source.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "proxy source path cannot be empty".to_string(),
        ));
    }

    if config.collect_successes && config.output.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty when collecting successes".to_string(),
        ));
    }

    Ok(())
}

/// Poll identifiers become a path segment, so they must stay a single segment
fn validate_identifier(name: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} is required", name)));
    }

    if value.contains(&['/', '?', '#'][..]) || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} must be a single path segment, got '{}'",
            name, value
        )));
    }

    Ok(())
}
