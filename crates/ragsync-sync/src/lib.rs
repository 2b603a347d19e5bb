//! ragsync Sync - incremental object-store to index synchronization
//!
//! Provides:
//! - A processed-key set that makes repeated passes idempotent
//! - A size policy that rejects oversized objects before any transfer
//! - The per-object download → storage → upload → attach protocol
//! - Sync passes over a paginated listing, and a scheduler running them
//!   on a timer or on demand
//!
//! ## Modules
//!
//! - [`state`] - [`ProcessedSet`](state::ProcessedSet), the transfer state store
//! - [`policy`] - [`SizePolicy`](policy::SizePolicy) admission checks
//! - [`transfer`] - [`TransferDriver`](transfer::TransferDriver), one object end to end
//! - [`engine`] - [`SyncEngine`](engine::SyncEngine), one full pass
//! - [`scheduler`] - [`SyncScheduler`](scheduler::SyncScheduler), timer and manual passes

pub mod engine;
pub mod policy;
pub mod scheduler;
pub mod state;
pub mod transfer;

use ragsync_core::ports::IndexError;
use thiserror::Error;

/// Errors that can occur while synchronizing objects
///
/// [`List`](SyncError::List) aborts the rest of a pass; every other variant
/// concerns a single object and the pass continues with the next one.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing the bucket failed
    #[error("listing failed: {0}")]
    List(String),

    /// Downloading the object failed
    #[error("download failed: {0}")]
    Download(String),

    /// Requesting an upload target failed
    #[error("storage request failed: {0}")]
    StorageRequest(#[source] IndexError),

    /// Uploading the bytes to the target failed
    #[error("upload failed: {0}")]
    Upload(#[source] IndexError),

    /// Attaching the uploaded file to the collection failed
    #[error("attach failed: {0}")]
    Attach(#[source] IndexError),

    /// The object exceeds the configured size limit
    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    SizeRejected {
        /// Object size in bytes
        size: i64,
        /// Configured limit in bytes
        limit: u64,
    },
}

impl SyncError {
    /// Returns true if the remote service rejected the payload as too large
    pub fn is_payload_too_large(&self) -> bool {
        match self {
            SyncError::StorageRequest(e) | SyncError::Upload(e) | SyncError::Attach(e) => {
                e.is_payload_too_large()
            }
            _ => false,
        }
    }
}
