//! HTTP access to the package index and artefact hosts.
//!
//! Provides a trait-based abstraction over the two requests the tool makes,
//! fetching a project page as JSON and streaming an artefact body, so the
//! resolver and fetch executor can be tested without network access.

use log::trace;
use std::io::Read;
use std::time::Duration;

/// Media type requested from the index (PEP 691 JSON, version 1).
pub const SIMPLE_JSON_CONTENT_TYPE: &str = "application/vnd.pypi.simple.v1+json";

/// Upper bound on a project page body.
const MAX_JSON_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Capability to fetch index pages and artefact bytes.
///
/// # Examples
///
/// ```no_run
/// use pypi_multidl::transport::{HttpTransport, Transport};
///
/// let transport = HttpTransport::new(None);
/// let body = transport.fetch_json("https://pypi.org/simple/requests/")?;
/// assert!(body.contains("files"));
/// # Ok::<(), pypi_multidl::transport::TransportError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Fetch `url` asking for the simple JSON API and return the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be read as UTF-8 text.
    fn fetch_json(&self, url: &str) -> Result<String, TransportError>;

    /// Open a streaming reader over the body of `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    fn open_stream(&self, url: &str) -> Result<Box<dyn Read>, TransportError>;
}

/// Errors arising from HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request failed before a usable response arrived.
    #[error("request failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with another non-success status.
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The status code received.
        status: u16,
    },
}

/// Blocking HTTP transport using `ureq`.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Build a transport; `timeout` bounds each request end to end.
    ///
    /// Without a timeout a stalled server blocks the run indefinitely.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Transport for HttpTransport {
    fn fetch_json(&self, url: &str) -> Result<String, TransportError> {
        trace!("GET {url} ({SIMPLE_JSON_CONTENT_TYPE})");
        let mut response = self
            .agent
            .get(url)
            .header("Accept", SIMPLE_JSON_CONTENT_TYPE)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_JSON_BODY_BYTES)
            .read_to_string()
            .map_err(|e| TransportError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn open_stream(&self, url: &str) -> Result<Box<dyn Read>, TransportError> {
        trace!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Map a ureq error to a [`TransportError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> TransportError {
    match err {
        ureq::Error::StatusCode(404) => TransportError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status) => TransportError::HttpStatus {
            url: url.to_owned(),
            status: *status,
        },
        other => TransportError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
