//! Remote indexing service HTTP client
//!
//! Wraps `reqwest::Client` with the bearer API key, base URL construction
//! and the status classification shared by every call.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ragsync_index::client::IndexClient;
//!
//! # fn example() -> Result<(), ragsync_core::ports::IndexError> {
//! let client = IndexClient::new("https://api.example.com", "api-key", Duration::from_secs(30))?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use ragsync_core::ports::IndexError;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

/// Timeout applied by [`IndexClient::with_base_url`]
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 500;

/// HTTP client for the remote indexing service
pub struct IndexClient {
    /// The underlying HTTP client (carries the per-request timeout)
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Bearer API key
    api_key: String,
}

impl std::fmt::Debug for IndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl IndexClient {
    /// Creates a client for the given service
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. `https://api.example.com`
    /// * `api_key` - Bearer API key
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Creates a client with a custom base URL and the default timeout (useful for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Base URL requests are built against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for an API path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. `/api/v1/storage`)
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url).bearer_auth(&self.api_key)
    }

    /// Creates an unauthenticated request to an absolute URL
    ///
    /// Used for pre-signed upload targets, which carry their own
    /// authorization and must not receive the API key.
    pub fn request_absolute(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

/// Maps a send failure to [`IndexError::Transport`]
pub(crate) fn transport(err: reqwest::Error) -> IndexError {
    if err.is_timeout() {
        IndexError::Transport(format!("request timed out: {err}"))
    } else {
        IndexError::Transport(err.to_string())
    }
}

/// Passes 2xx responses through and classifies everything else
///
/// 413 becomes [`IndexError::PayloadTooLarge`]; other statuses become
/// [`IndexError::Status`] with a truncated body.
pub(crate) async fn check_status(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY)
        .collect();
    debug!(status = status.as_u16(), body = %body, "Index service returned error status");

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Err(IndexError::PayloadTooLarge(if body.is_empty() {
            "HTTP 413".to_string()
        } else {
            body
        }))
    } else {
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
