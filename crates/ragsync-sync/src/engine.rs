//! Sync pass engine
//!
//! The [`SyncEngine`] runs one enumeration-and-transfer pass over the
//! configured prefix.
//!
//! ## Pass Flow
//!
//! 1. **List**: pull one page at a time from the object store
//! 2. **Admit**: reject oversized objects via the [`SizePolicy`]; the key is
//!    committed so later passes skip it
//! 3. **Dedup**: skip keys already in the [`ProcessedSet`]
//! 4. **Transfer**: run the [`TransferDriver`] for everything else
//! 5. **Summary**: log counts, duration and one line per error
//!
//! Objects within a pass are handled sequentially. A listing failure stops
//! the pass; outcomes of objects already handled are kept.

use std::sync::Arc;
use std::time::Instant;

use ragsync_core::domain::{normalize_prefix, ObjectDescriptor, PassId, PassTrigger, SyncPassResult};
use ragsync_core::ports::{IIndexService, IObjectStore};
use tracing::{debug, error, info, warn};

use crate::policy::{Admission, SizePolicy};
use crate::state::ProcessedSet;
use crate::transfer::TransferDriver;
use crate::SyncError;

/// Runs sync passes against one bucket prefix
pub struct SyncEngine {
    store: Arc<dyn IObjectStore>,
    driver: TransferDriver,
    state: Arc<ProcessedSet>,
    policy: SizePolicy,
    prefix: String,
}

impl SyncEngine {
    /// Creates a new engine
    ///
    /// # Arguments
    /// * `store` - Object store to list and download from
    /// * `index` - Remote indexing service
    /// * `state` - Shared processed-key set
    /// * `policy` - Size admission policy
    /// * `prefix` - Key prefix; normalized before use
    pub fn new(
        store: Arc<dyn IObjectStore>,
        index: Arc<dyn IIndexService>,
        state: Arc<ProcessedSet>,
        policy: SizePolicy,
        prefix: &str,
    ) -> Self {
        let driver = TransferDriver::new(Arc::clone(&store), index, Arc::clone(&state));
        Self {
            store,
            driver,
            state,
            policy,
            prefix: normalize_prefix(prefix),
        }
    }

    /// Shared processed-key set
    pub fn state(&self) -> &Arc<ProcessedSet> {
        &self.state
    }

    /// Normalized prefix the engine lists under
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Bucket of the underlying object store
    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    /// Size policy applied to every object
    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    /// Runs one full pass
    ///
    /// Always returns a result; a listing failure is reported through
    /// [`SyncPassResult::aborted`].
    #[tracing::instrument(skip(self), fields(bucket = %self.store.bucket(), prefix = %self.prefix))]
    pub async fn run_pass(&self, pass_id: PassId, trigger: PassTrigger) -> SyncPassResult {
        let start = Instant::now();
        let mut result = SyncPassResult::new(pass_id, trigger);

        info!("Starting sync pass");

        let mut continuation: Option<String> = None;
        let mut page_number: u32 = 0;
        loop {
            page_number += 1;
            let page = match self
                .store
                .list_page(&self.prefix, continuation.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    let err = SyncError::List(format!("{err:#}"));
                    error!(page = page_number, error = %err, "Listing failed, aborting pass");
                    result.abort(err.to_string());
                    break;
                }
            };

            debug!(
                page = page_number,
                objects = page.objects.len(),
                "Processing listing page"
            );

            for object in &page.objects {
                result.record_found();
                self.handle_object(object, &mut result).await;
            }

            match page.next_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        result.finish(start.elapsed().as_millis() as u64);
        log_summary(&result);
        result
    }

    /// Applies admission, dedup and transfer to one listed object
    async fn handle_object(&self, object: &ObjectDescriptor, result: &mut SyncPassResult) {
        let key = object.key.as_str();

        if let Admission::RejectTooLarge { size, limit } = self.policy.admit(object) {
            // Terminal: only the pass that first rejects the key reports it
            if self.state.mark_processed(key) {
                let err = SyncError::SizeRejected { size, limit };
                warn!(key, size, limit, "Rejecting oversized object");
                result.record_failure(format!("{key}: {err}"));
            } else {
                debug!(key, "Skipping already processed object");
                result.record_skip();
            }
            return;
        }

        if self.state.is_processed(key) {
            debug!(key, "Skipping already processed object");
            result.record_skip();
            return;
        }

        match self.driver.transfer(object).await {
            Ok(receipt) => {
                info!(
                    key,
                    file_id = %receipt.file_id,
                    bytes = receipt.bytes,
                    download_ms = receipt.download_ms,
                    upload_ms = receipt.upload_ms,
                    "Object synced"
                );
                result.record_success();
            }
            Err(err) => {
                warn!(
                    key,
                    error = %err,
                    payload_too_large = err.is_payload_too_large(),
                    "Object transfer failed"
                );
                result.record_failure(format!("{key}: {err}"));
            }
        }
    }
}

/// Logs the end-of-pass summary
fn log_summary(result: &SyncPassResult) {
    info!(
        pass_id = %result.pass_id,
        trigger = %result.trigger,
        total_found = result.total_found,
        succeeded = result.succeeded,
        skipped = result.skipped,
        failed = result.failed,
        aborted = result.aborted.is_some(),
        duration_ms = result.duration_ms,
        "Sync pass completed"
    );

    for (i, message) in result.errors.iter().enumerate() {
        warn!(pass_id = %result.pass_id, index = i + 1, "{message}");
    }
}
