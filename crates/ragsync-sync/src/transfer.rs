//! Transfer protocol driver
//!
//! Moves one object from the bucket into the indexing service:
//!
//! ```text
//! get_object ──→ request_storage ──→ upload ──→ attach ──→ mark_processed
//! ```
//!
//! Either every step succeeds and the key is committed, or nothing is
//! committed and a later pass retries the object from the start. An upload
//! target is never reused across attempts.

use std::sync::Arc;
use std::time::Instant;

use ragsync_core::domain::ObjectDescriptor;
use ragsync_core::ports::{IIndexService, IObjectStore};
use tracing::{debug, instrument};

use crate::state::ProcessedSet;
use crate::SyncError;

/// What a successful transfer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Identifier the file was attached under
    pub file_id: String,
    /// Bytes downloaded and uploaded
    pub bytes: usize,
    /// Time spent downloading, in milliseconds
    pub download_ms: u64,
    /// Time spent on storage request, upload and attach, in milliseconds
    pub upload_ms: u64,
    /// False if a concurrent pass had already committed the key
    pub newly_committed: bool,
}

/// Runs the transfer protocol for single objects
pub struct TransferDriver {
    store: Arc<dyn IObjectStore>,
    index: Arc<dyn IIndexService>,
    state: Arc<ProcessedSet>,
}

impl TransferDriver {
    pub fn new(
        store: Arc<dyn IObjectStore>,
        index: Arc<dyn IIndexService>,
        state: Arc<ProcessedSet>,
    ) -> Self {
        Self {
            store,
            index,
            state,
        }
    }

    /// Transfers one object and commits its key on success
    ///
    /// # Errors
    /// Returns the [`SyncError`] of the first failing step; the key is left
    /// uncommitted.
    #[instrument(skip(self, object), fields(key = %object.key, size = object.size))]
    pub async fn transfer(&self, object: &ObjectDescriptor) -> Result<TransferReceipt, SyncError> {
        let key = &object.key;

        // Step 1: download
        let started = Instant::now();
        let data = self
            .store
            .get_object(key)
            .await
            .map_err(|e| SyncError::Download(format!("{e:#}")))?;
        let download_ms = started.elapsed().as_millis() as u64;
        debug!(bytes = data.len(), download_ms, "Downloaded object");

        let content_type = key.content_type();
        let filename = key.file_name();

        // Step 2: request an upload target
        let started = Instant::now();
        let handle = self
            .index
            .request_storage(content_type, filename)
            .await
            .map_err(SyncError::StorageRequest)?;

        // Step 3: upload the bytes
        self.index
            .upload(&handle, content_type, &data)
            .await
            .map_err(SyncError::Upload)?;

        // Step 4: attach; this is the commit point
        let file_id = handle.file_id_or(key.as_str()).to_string();
        if handle.file_id.is_none() {
            debug!("Storage response carried no file id, attaching by object key");
        }
        self.index
            .attach(&file_id)
            .await
            .map_err(SyncError::Attach)?;
        let upload_ms = started.elapsed().as_millis() as u64;

        let newly_committed = self.state.mark_processed(key.as_str());
        if !newly_committed {
            debug!("Key was already committed by a concurrent pass");
        }

        Ok(TransferReceipt {
            file_id,
            bytes: data.len(),
            download_ms,
            upload_ms,
            newly_committed,
        })
    }
}
