//! Form submission through a forward proxy
//!
//! This module handles the HTTP side of a run:
//! - Building a client that forwards through one proxy endpoint
//! - Posting the configured form to the target URL
//! - Classifying the outcome as success or failure

use crate::action::{Action, ActionError};
use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Upper bound on the TCP connect phase, independent of the request timeout
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts `field=value` to a target URL through each endpoint it is given
#[derive(Debug, Clone)]
pub struct FormSubmission {
    target: Url,
    field: String,
    value: String,
    timeout: Duration,
    user_agent: Option<String>,
    require_success_status: bool,
}

impl FormSubmission {
    /// Creates a submission posting `field=value` to `target`
    pub fn new(target: Url, field: impl Into<String>, value: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target,
            field: field.into(),
            value: value.into(),
            timeout,
            user_agent: None,
            require_success_status: false,
        }
    }

    /// Builds the submission described by a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let target = config.target.submission_url()?;

        let mut submission = Self::new(
            target,
            config.target.form_field.clone(),
            config.target.option_id.clone(),
            config.pool.timeout(),
        )
        .with_require_success_status(config.target.require_success_status);

        if let Some(user_agent) = &config.target.user_agent {
            submission = submission.with_user_agent(user_agent.clone());
        }

        Ok(submission)
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    pub fn with_require_success_status(mut self, require: bool) -> Self {
        self.require_success_status = require;
        self
    }

    /// URL every form is posted to
    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Action for FormSubmission {
    /// Posts the form once through `endpoint`
    ///
    /// # Outcome
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP response | Success |
    /// | Non-2xx with `require-success-status` | `Status` |
    /// | Deadline exceeded | `Timeout` |
    /// | Proxy unreachable | `Connect` |
    /// | Anything else | `Request` |
    async fn perform(&self, endpoint: &Endpoint) -> Result<(), ActionError> {
        let client = build_proxy_client(endpoint, self.timeout, self.user_agent.as_deref())
            .map_err(|e| ActionError::Client(e.to_string()))?;

        let response = client
            .post(self.target.clone())
            .form(&[(self.field.as_str(), self.value.as_str())])
            .send()
            .await?;

        let status = response.status();
        if self.require_success_status && !status.is_success() {
            return Err(ActionError::Status(status.as_u16()));
        }

        Ok(())
    }
}

/// Builds an HTTP client that sends every request through `endpoint`
///
/// # Arguments
///
/// * `endpoint` - The forward proxy to use
/// * `timeout` - Deadline for a whole request
/// * `user_agent` - Optional User-Agent header
///
/// # Returns
///
/// * `Ok(Client)` - Client bound to the proxy
/// * `Err(reqwest::Error)` - The proxy URL was rejected
pub fn build_proxy_client(
    endpoint: &Endpoint,
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let proxy = Proxy::all(endpoint.url().as_str())?;

    let mut builder = Client::builder()
        .proxy(proxy)
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT));

    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submission(target: &str) -> FormSubmission {
        FormSubmission::new(
            Url::parse(target).unwrap(),
            "options",
            "139529712",
            Duration::from_secs(5),
        )
    }

    /// The mock server plays the forward proxy: reqwest sends it the
    /// absolute-form request for the (never resolved) target host.
    fn proxy_endpoint(server: &MockServer) -> Endpoint {
        Endpoint::parse(&server.address().to_string()).unwrap()
    }

    #[test]
    fn test_build_proxy_client() {
        let endpoint = Endpoint::parse("127.0.0.1:8080").unwrap();
        assert!(build_proxy_client(&endpoint, Duration::from_secs(5), None).is_ok());
        assert!(build_proxy_client(&endpoint, Duration::from_secs(5), Some("Fanout/1.0")).is_ok());

        let socks = Endpoint::parse("socks5://127.0.0.1:1080").unwrap();
        assert!(build_proxy_client(&socks, Duration::from_secs(5), None).is_ok());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.target.base_url = "https://poll.example.com".to_string();
        config.target.poll_id = "17338883".to_string();
        config.target.option_id = "139529712".to_string();
        config.pool.timeout_secs = 12;

        let submission = FormSubmission::from_config(&config).unwrap();
        assert_eq!(submission.target().as_str(), "https://poll.example.com/17338883");
        assert_eq!(submission.timeout(), Duration::from_secs(12));
        assert!(!submission.require_success_status);
    }

    #[tokio::test]
    async fn test_perform_posts_form_through_proxy() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/17338883"))
            .and(body_string("options=139529712"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&proxy)
            .await;

        let endpoint = proxy_endpoint(&proxy);
        let result = submission("http://poll.test/17338883").perform(&endpoint).await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_any_status_counts_by_default() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&proxy)
            .await;

        let endpoint = proxy_endpoint(&proxy);
        let result = submission("http://poll.test/1").perform(&endpoint).await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_strict_status_rejects_errors() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&proxy)
            .await;

        let endpoint = proxy_endpoint(&proxy);
        let result = submission("http://poll.test/1")
            .with_require_success_status(true)
            .perform(&endpoint)
            .await;

        assert_eq!(result, Err(ActionError::Status(503)));
    }

    #[tokio::test]
    async fn test_slow_proxy_times_out() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&proxy)
            .await;

        let endpoint = proxy_endpoint(&proxy);
        let action = FormSubmission::new(
            Url::parse("http://poll.test/1").unwrap(),
            "options",
            "1",
            Duration::from_millis(200),
        );

        assert_eq!(action.perform(&endpoint).await, Err(ActionError::Timeout));
    }

    #[tokio::test]
    async fn test_dead_proxy_fails() {
        // Bind then drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = Endpoint::parse(&format!("127.0.0.1:{}", port)).unwrap();

        let result = submission("http://poll.test/1").perform(&endpoint).await;
        assert!(result.is_err());
    }
}
