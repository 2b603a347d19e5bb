//! In-memory fakes of the object store and indexing service ports

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use ragsync_core::domain::{ObjectDescriptor, ObjectKey, ObjectPage};
use ragsync_core::ports::{IIndexService, IObjectStore, IndexError, RemoteFileHandle};
use ragsync_sync::engine::SyncEngine;
use ragsync_sync::policy::SizePolicy;
use ragsync_sync::state::ProcessedSet;
use tokio::sync::Barrier;

// ============================================================================
// FakeObjectStore
// ============================================================================

/// Bucket held in memory, listed in pages of `page_size`
pub struct FakeObjectStore {
    objects: Vec<ObjectDescriptor>,
    bodies: HashMap<String, Vec<u8>>,
    page_size: usize,
    /// Zero-based page index whose listing fails
    fail_list_at_page: Option<usize>,
    fail_download: Mutex<HashSet<String>>,
    download_barrier: Option<Arc<Barrier>>,
    pub listed_prefixes: Mutex<Vec<String>>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bodies: HashMap::new(),
            page_size: 1000,
            fail_list_at_page: None,
            fail_download: Mutex::new(HashSet::new()),
            download_barrier: None,
            listed_prefixes: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    /// Adds an object whose listed size is its body length
    pub fn with_object(self, key: &str, body: &[u8]) -> Self {
        let size = body.len() as i64;
        self.with_sized_object(key, body, size)
    }

    /// Adds an object whose listed size differs from its body
    pub fn with_sized_object(mut self, key: &str, body: &[u8], size: i64) -> Self {
        let key_obj = ObjectKey::new(key.to_string()).expect("valid key");
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        self.objects
            .push(ObjectDescriptor::new(key_obj, size, modified));
        self.objects.sort_by(|a, b| a.key.cmp(&b.key));
        self.bodies.insert(key.to_string(), body.to_vec());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn failing_list_at_page(mut self, page: usize) -> Self {
        self.fail_list_at_page = Some(page);
        self
    }

    pub fn failing_download(self, key: &str) -> Self {
        self.fail_download.lock().unwrap().insert(key.to_string());
        self
    }

    /// Makes every download wait until `parties` downloads are in progress
    pub fn with_download_barrier(mut self, parties: usize) -> Self {
        self.download_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn clear_failures(&self) {
        self.fail_download.lock().unwrap().clear();
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl IObjectStore for FakeObjectStore {
    fn bucket(&self) -> &str {
        "fake-bucket"
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> anyhow::Result<ObjectPage> {
        self.listed_prefixes.lock().unwrap().push(prefix.to_string());

        let offset: usize = match continuation {
            Some(token) => token.parse()?,
            None => 0,
        };
        let page_index = offset / self.page_size;
        if self.fail_list_at_page == Some(page_index) {
            anyhow::bail!("simulated listing failure on page {page_index}");
        }

        let matching: Vec<&ObjectDescriptor> = self
            .objects
            .iter()
            .filter(|o| o.key.as_str().starts_with(prefix))
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let objects = matching[offset.min(end)..end]
            .iter()
            .map(|o| (*o).clone())
            .collect();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ObjectPage {
            objects,
            next_token,
        })
    }

    async fn get_object(&self, key: &ObjectKey) -> anyhow::Result<Vec<u8>> {
        self.downloads.lock().unwrap().push(key.to_string());

        if let Some(barrier) = &self.download_barrier {
            barrier.wait().await;
        }

        if self.fail_download.lock().unwrap().contains(key.as_str()) {
            anyhow::bail!("simulated download failure (HTTP 503)");
        }

        self.bodies
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("NoSuchKey: {key}"))
    }
}

// ============================================================================
// FakeIndexService
// ============================================================================

/// One recorded call to the fake service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Storage { content_type: String, filename: String },
    Upload { target: String, content_type: String, bytes: usize },
    Attach { file_id: String },
}

/// Indexing service held in memory
pub struct FakeIndexService {
    pub calls: Mutex<Vec<Call>>,
    attached: Mutex<HashMap<String, usize>>,
    missing_url_for: Mutex<HashSet<String>>,
    fail_upload_for: Mutex<HashSet<String>>,
    fail_attach_for: Mutex<HashSet<String>>,
    too_large_for: Mutex<HashSet<String>>,
    omit_file_id: bool,
    reject_repeat_attach: bool,
}

impl FakeIndexService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            attached: Mutex::new(HashMap::new()),
            missing_url_for: Mutex::new(HashSet::new()),
            fail_upload_for: Mutex::new(HashSet::new()),
            fail_attach_for: Mutex::new(HashSet::new()),
            too_large_for: Mutex::new(HashSet::new()),
            omit_file_id: false,
            reject_repeat_attach: false,
        }
    }

    /// Storage responses for `filename` carry no upload URL
    pub fn missing_upload_url_for(self, filename: &str) -> Self {
        self.missing_url_for.lock().unwrap().insert(filename.to_string());
        self
    }

    /// Uploads to the target for `filename` fail with 403
    pub fn failing_upload_for(self, filename: &str) -> Self {
        self.fail_upload_for.lock().unwrap().insert(filename.to_string());
        self
    }

    /// Attaching `file_id` fails with 500
    pub fn failing_attach_for(self, file_id: &str) -> Self {
        self.fail_attach_for.lock().unwrap().insert(file_id.to_string());
        self
    }

    /// Attaching `file_id` fails with 413
    pub fn too_large_for(self, file_id: &str) -> Self {
        self.too_large_for.lock().unwrap().insert(file_id.to_string());
        self
    }

    /// Storage responses carry no file id
    pub fn without_file_ids(mut self) -> Self {
        self.omit_file_id = true;
        self
    }

    /// The second attach of the same file id fails
    pub fn rejecting_repeat_attach(mut self) -> Self {
        self.reject_repeat_attach = true;
        self
    }

    pub fn clear_failures(&self) {
        self.missing_url_for.lock().unwrap().clear();
        self.fail_upload_for.lock().unwrap().clear();
        self.fail_attach_for.lock().unwrap().clear();
        self.too_large_for.lock().unwrap().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn storage_requests_for(&self, filename: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Storage { filename: f, .. } if f == filename))
            .count()
    }

    /// Successful attaches per file id
    pub fn attach_count(&self, file_id: &str) -> usize {
        self.attached
            .lock()
            .unwrap()
            .get(file_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl IIndexService for FakeIndexService {
    async fn request_storage(
        &self,
        content_type: &str,
        filename: &str,
    ) -> Result<RemoteFileHandle, IndexError> {
        self.calls.lock().unwrap().push(Call::Storage {
            content_type: content_type.to_string(),
            filename: filename.to_string(),
        });

        if self.missing_url_for.lock().unwrap().contains(filename) {
            return Err(IndexError::MissingUploadUrl);
        }

        Ok(RemoteFileHandle {
            file_id: (!self.omit_file_id).then(|| format!("file-{filename}")),
            upload_target: format!("https://uploads.test/{filename}"),
        })
    }

    async fn upload(
        &self,
        handle: &RemoteFileHandle,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), IndexError> {
        self.calls.lock().unwrap().push(Call::Upload {
            target: handle.upload_target.clone(),
            content_type: content_type.to_string(),
            bytes: data.len(),
        });

        let filename = handle
            .upload_target
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if self.fail_upload_for.lock().unwrap().contains(&filename) {
            return Err(IndexError::Status {
                status: 403,
                body: "signature expired".to_string(),
            });
        }
        Ok(())
    }

    async fn attach(&self, file_id: &str) -> Result<(), IndexError> {
        self.calls.lock().unwrap().push(Call::Attach {
            file_id: file_id.to_string(),
        });

        if self.too_large_for.lock().unwrap().contains(file_id) {
            return Err(IndexError::PayloadTooLarge("file exceeds 10MB".to_string()));
        }
        if self.fail_attach_for.lock().unwrap().contains(file_id) {
            return Err(IndexError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        let mut attached = self.attached.lock().unwrap();
        let count = attached.entry(file_id.to_string()).or_insert(0);
        if self.reject_repeat_attach && *count > 0 {
            return Err(IndexError::Status {
                status: 409,
                body: format!("{file_id} already attached"),
            });
        }
        *count += 1;
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub store: Arc<FakeObjectStore>,
    pub index: Arc<FakeIndexService>,
    pub state: Arc<ProcessedSet>,
    pub engine: Arc<SyncEngine>,
}

pub fn harness(
    store: FakeObjectStore,
    index: FakeIndexService,
    policy: SizePolicy,
    prefix: &str,
) -> Harness {
    let store = Arc::new(store);
    let index = Arc::new(index);
    let state = Arc::new(ProcessedSet::new());
    let engine = Arc::new(SyncEngine::new(
        store.clone(),
        index.clone(),
        Arc::clone(&state),
        policy,
        prefix,
    ));
    Harness {
        store,
        index,
        state,
        engine,
    }
}
