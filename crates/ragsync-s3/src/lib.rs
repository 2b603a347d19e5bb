//! ragsync S3 - S3-compatible object store adapter
//!
//! Provides an async client for:
//! - Paginated bucket listings (`ListObjectsV2`)
//! - Whole-object downloads (`GetObject`)
//! - A `HeadBucket` connectivity probe
//!
//! Requests go over plain HTTPS with AWS Signature V4. Custom endpoints
//! (MinIO, LocalStack) are addressed path-style, AWS virtual-hosted style.
//!
//! ## Modules
//!
//! - [`signing`] - AWS Signature V4 request signing
//! - [`listing`] - `ListObjectsV2` XML response parsing
//! - [`store`] - [`S3ObjectStore`], the `IObjectStore` implementation

pub mod listing;
pub mod signing;
pub mod store;

pub use store::S3ObjectStore;

use thiserror::Error;

/// Errors that can occur when talking to the object store
#[derive(Debug, Error)]
pub enum S3Error {
    /// The configured endpoint could not be parsed as a URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The HTTP client could not be built
    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The bucket does not exist or the key was not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials were rejected or are missing for a private bucket
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The key cannot be expressed as a request path
    #[error("Key cannot be addressed over HTTP: {0}")]
    UnaddressableKey(String),

    /// The listing body was not valid `ListBucketResult` XML
    #[error("Invalid listing response: {0}")]
    InvalidListing(String),
}

impl S3Error {
    /// Classifies a non-success response
    pub(crate) fn from_status(status: u16, context: &str, body: String) -> Self {
        match status {
            404 => S3Error::NotFound(context.to_string()),
            401 | 403 => S3Error::AccessDenied(context.to_string()),
            _ => S3Error::Status {
                status,
                body: body.chars().take(500).collect(),
            },
        }
    }
}
