use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default poll site every form is posted to
pub const DEFAULT_BASE_URL: &str = "https://www.strawpoll.me";

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 100;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default form field carrying the option identifier
pub const DEFAULT_FORM_FIELD: &str = "options";

/// Default proxy list location
pub const DEFAULT_SOURCE_PATH: &str = "proxies.json";

/// Default location of the clean proxy list
pub const DEFAULT_OUTPUT_PATH: &str = "clean-proxies.json";

/// Main configuration structure for Proxy-Fanout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub pool: PoolConfig,
    pub proxies: ProxiesConfig,
}

/// Where the form goes and what it carries
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL the poll identifier is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Poll identifier, used as the request path
    #[serde(rename = "poll-id")]
    pub poll_id: String,

    /// Option identifier, sent as the form payload
    #[serde(rename = "option-id")]
    pub option_id: String,

    /// Name of the form field carrying the option identifier
    #[serde(rename = "form-field")]
    pub form_field: String,

    /// Optional User-Agent header for every submission
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Treat non-2xx responses as failures
    #[serde(rename = "require-success-status")]
    pub require_success_status: bool,
}

/// Worker pool sizing and pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of persistent workers
    pub workers: usize,

    /// Number of proxy entries to skip before dispatching
    #[serde(rename = "start-offset")]
    pub start_offset: usize,

    /// Per-request deadline (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// Proxy list input and clean-list output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxiesConfig {
    /// Path to the proxy list
    pub source: PathBuf,

    /// Record proxies whose submission succeeded
    #[serde(rename = "collect-successes")]
    pub collect_successes: bool,

    /// Where the clean proxy list is written
    pub output: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_id: String::new(),
            option_id: String::new(),
            form_field: DEFAULT_FORM_FIELD.to_string(),
            user_agent: None,
            require_success_status: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            start_offset: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ProxiesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_PATH),
            collect_successes: false,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl TargetConfig {
    /// Builds the URL every form is posted to: `base-url` + `poll-id`
    ///
    /// A missing trailing slash on the base is added first so the poll
    /// identifier extends the base path instead of replacing its last segment.
    pub fn submission_url(&self) -> Result<Url, ConfigError> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base = Url::parse(&base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", self.base_url, e)))?;

        base.join(&self.poll_id)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid poll-id '{}': {}", self.poll_id, e)))
    }
}

impl PoolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Values supplied on the command line
///
/// Every field left as `None` keeps whatever the config file (or the default)
/// provided.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub poll_id: Option<String>,
    pub option_id: Option<String>,
    pub form_field: Option<String>,
    pub require_success_status: Option<bool>,
    pub workers: Option<usize>,
    pub start_offset: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub source: Option<PathBuf>,
    pub collect_successes: Option<bool>,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Layers command-line overrides on top of this configuration
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.target.base_url = base_url;
        }
        if let Some(poll_id) = overrides.poll_id {
            self.target.poll_id = poll_id;
        }
        if let Some(option_id) = overrides.option_id {
            self.target.option_id = option_id;
        }
        if let Some(form_field) = overrides.form_field {
            self.target.form_field = form_field;
        }
        if let Some(strict) = overrides.require_success_status {
            self.target.require_success_status = strict;
        }
        if let Some(workers) = overrides.workers {
            self.pool.workers = workers;
        }
        if let Some(offset) = overrides.start_offset {
            self.pool.start_offset = offset;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.pool.timeout_secs = timeout;
        }
        if let Some(source) = overrides.source {
            self.proxies.source = source;
        }
        if let Some(collect) = overrides.collect_successes {
            self.proxies.collect_successes = collect;
        }
        if let Some(output) = overrides.output {
            self.proxies.output = output;
        }
    }
}
