use crate::endpoint::Endpoint;
use crate::EndpointError;
use url::Url;

/// Proxy schemes the HTTP client can forward through
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Parses a proxy list entry into an [`Endpoint`]
///
/// # Accepted Forms
///
/// 1. `host:port` - treated as a plain HTTP proxy
/// 2. `scheme://host:port` - `http`, `https`, `socks5` or `socks5h`
///
/// The port must be written out explicitly, and the entry must not carry a
/// path, query or fragment.
///
/// # Examples
///
/// ```
/// use proxy_fanout::endpoint::parse_endpoint;
///
/// let endpoint = parse_endpoint("127.0.0.1:8080").unwrap();
/// assert_eq!(endpoint.authority(), "127.0.0.1:8080");
/// assert_eq!(endpoint.scheme(), "http");
///
/// assert!(parse_endpoint("bad").is_err());
/// ```
pub fn parse_endpoint(entry: &str) -> Result<Endpoint, EndpointError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(EndpointError::Parse {
            entry: entry.to_string(),
            reason: "empty entry".to_string(),
        });
    }

    let raw = if entry.contains("://") {
        entry.to_string()
    } else {
        format!("http://{}", entry)
    };

    let url = Url::parse(&raw).map_err(|e| EndpointError::Parse {
        entry: entry.to_string(),
        reason: e.to_string(),
    })?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(EndpointError::InvalidScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(EndpointError::MissingHost(entry.to_string())),
    };

    // Url drops ports equal to the scheme default, so look at the raw text too
    if url.port().is_none() && !has_explicit_port(&raw) {
        return Err(EndpointError::MissingPort(entry.to_string()));
    }
    let port = url
        .port_or_known_default()
        .ok_or_else(|| EndpointError::MissingPort(entry.to_string()))?;

    if !matches!(url.path(), "" | "/") || url.query().is_some() || url.fragment().is_some() {
        return Err(EndpointError::Malformed(entry.to_string()));
    }

    Ok(Endpoint {
        authority: format!("{}:{}", host, port),
        url,
    })
}

/// Checks whether the authority part of a URL string ends in `:<digits>`
fn has_explicit_port(raw: &str) -> bool {
    let after_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = after_scheme
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    match host_port.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
