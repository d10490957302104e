//! HTTP fetcher implementation
//!
//! This module handles all outbound requests for the crawler:
//! - Building the shared HTTP client with user agent and timeout
//! - Performing a single GET per page or image
//! - Classifying every failure into a [`FetchError`]

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure of a single GET request
///
/// Every network-layer problem is converted into one of these; the fetcher
/// never panics or propagates raw `reqwest` errors to the coordinator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request (connect, headers or body) exceeded the configured timeout
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// Connection refused, DNS failure, TLS failure, broken body stream, ...
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Connection {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The same client serves page and image requests. Redirects are followed
/// with reqwest's default policy; no cookies are kept between requests.
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Bound applied to every request, including connect
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the raw response body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(body)` |
/// | non-2xx | `HttpStatus` |
/// | timeout (connect, headers or body) | `Timeout` |
/// | anything else on the wire | `Connection` |
///
/// No retries: a failed fetch is abandoned.
pub async fn fetch_bytes(client: &Client, url: &Url) -> Result<Vec<u8>, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    tracing::trace!("Fetched {} ({} bytes)", url, body.len());
    Ok(body.to_vec())
}
