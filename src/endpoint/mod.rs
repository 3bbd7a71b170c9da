//! Proxy endpoint handling for Proxy-Fanout
//!
//! A proxy list entry is turned into an [`Endpoint`] before it is handed to a
//! worker. Entries that cannot be turned into a usable forwarding address are
//! rejected here, so workers only ever see validated endpoints.

mod parse;

pub use parse::parse_endpoint;

use std::fmt;
use url::Url;

/// A validated forward-proxy address
///
/// Immutable once built. The dispatcher owns it until the handoff, after
/// which it belongs to the worker that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    authority: String,
}

impl Endpoint {
    /// Parses a proxy list entry such as `"10.0.0.1:8080"` or `"socks5://host:1080"`
    pub fn parse(entry: &str) -> Result<Self, crate::EndpointError> {
        parse_endpoint(entry)
    }

    /// Full proxy URL handed to the HTTP client
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Proxy scheme (`http`, `https` or `socks5`)
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The `host:port` identifying this proxy
    ///
    /// This is what the success collector records, so a clean list can be fed
    /// straight back in as a proxy source.
    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority)
    }
}
