//! Remote indexing service port (driven/secondary port)
//!
//! The remote service separates storage provisioning from logical
//! registration, so handing an object over takes three calls:
//!
//! ```text
//! request_storage ──→ RemoteFileHandle ──→ upload(bytes) ──→ attach(file_id)
//! ```
//!
//! Only a successful `attach` means the object is part of the collection.
//! An object that was uploaded but not attached is not considered synced.
//!
//! ## Design Notes
//!
//! - Unlike [`IObjectStore`](super::IObjectStore) this port uses a typed
//!   [`IndexError`], because the engine reports `413 Payload Too Large`
//!   differently from other failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the remote indexing service adapter
#[derive(Debug, Error)]
pub enum IndexError {
    /// The request could not be sent or the response could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The service rejected the payload as too large (HTTP 413)
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The storage response carried none of the known upload-URL fields
    #[error("storage response contains no upload URL")]
    MissingUploadUrl,

    /// The response body was not in the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IndexError {
    /// Returns true for the 413 classification
    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, IndexError::PayloadTooLarge(_))
    }
}

/// Upload target provisioned by the remote service for one object
///
/// Valid only for the transfer attempt that requested it; never cached
/// across objects or passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileHandle {
    /// Identifier of the provisioned file, when the service returned one
    pub file_id: Option<String>,
    /// Absolute URL the object bytes are PUT to
    pub upload_target: String,
}

impl RemoteFileHandle {
    /// File identifier to attach, falling back to `fallback` (the object key)
    pub fn file_id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.file_id.as_deref().unwrap_or(fallback)
    }
}

/// Port trait for the remote indexing service
#[async_trait::async_trait]
pub trait IIndexService: Send + Sync {
    /// Asks the service for an upload target
    ///
    /// # Arguments
    /// * `content_type` - MIME type of the object
    /// * `filename` - Basename of the object key
    async fn request_storage(
        &self,
        content_type: &str,
        filename: &str,
    ) -> Result<RemoteFileHandle, IndexError>;

    /// Uploads the object bytes to the provisioned target
    ///
    /// # Arguments
    /// * `handle` - Target returned by [`request_storage`](Self::request_storage)
    /// * `content_type` - Same MIME type used when requesting storage
    /// * `data` - Full object body
    async fn upload(
        &self,
        handle: &RemoteFileHandle,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), IndexError>;

    /// Registers an uploaded file with the target collection
    ///
    /// # Arguments
    /// * `file_id` - Identifier of the uploaded file
    async fn attach(&self, file_id: &str) -> Result<(), IndexError>;
}
