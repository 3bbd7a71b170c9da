//! The unit of work a worker performs against one proxy endpoint
//!
//! Workers only know the [`Action`] trait. The production action,
//! [`FormSubmission`], posts a form through the endpoint; tests plug in
//! in-memory actions to drive the pool deterministically.

mod form;

pub use form::{build_proxy_client, FormSubmission};

use crate::endpoint::Endpoint;
use async_trait::async_trait;
use thiserror::Error;

/// Why a single action failed
///
/// None of these are fatal: the worker reports the error and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Failed to build client for proxy: {0}")]
    Client(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for ActionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ActionError::Timeout
        } else if e.is_connect() {
            ActionError::Connect(e.to_string())
        } else if e.is_builder() {
            ActionError::Client(e.to_string())
        } else {
            ActionError::Request(e.to_string())
        }
    }
}

/// Work performed once per dispatched endpoint
///
/// An action is shared read-only by every worker. It is attempted exactly
/// once per endpoint; `Ok(())` means that first attempt succeeded.
#[async_trait]
pub trait Action: Send + Sync {
    async fn perform(&self, endpoint: &Endpoint) -> Result<(), ActionError>;
}
