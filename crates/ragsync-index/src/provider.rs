//! IndexServiceProvider - IIndexService implementation over HTTP
//!
//! Wraps the [`IndexClient`] and delegates to the [`storage`](crate::storage)
//! and [`upload`](crate::upload) modules to fulfil the [`IIndexService`]
//! port contract for one collection.

use ragsync_core::config::IndexConfig;
use ragsync_core::ports::{IIndexService, IndexError, RemoteFileHandle};

use crate::client::IndexClient;
use crate::{storage, upload};

/// HTTP-backed [`IIndexService`] bound to a single collection
#[derive(Debug)]
pub struct IndexServiceProvider {
    client: IndexClient,
    rag_id: String,
}

impl IndexServiceProvider {
    /// Creates a provider from an existing client
    pub fn new(client: IndexClient, rag_id: impl Into<String>) -> Self {
        Self {
            client,
            rag_id: rag_id.into(),
        }
    }

    /// Creates a provider from the `index` configuration section
    pub fn from_config(config: &IndexConfig) -> Result<Self, IndexError> {
        let client = IndexClient::new(
            config.api_url.clone(),
            config.api_key.clone(),
            std::time::Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(client, config.rag_id.clone()))
    }

    /// Collection the provider attaches files to
    pub fn rag_id(&self) -> &str {
        &self.rag_id
    }
}

#[async_trait::async_trait]
impl IIndexService for IndexServiceProvider {
    async fn request_storage(
        &self,
        content_type: &str,
        filename: &str,
    ) -> Result<RemoteFileHandle, IndexError> {
        storage::request_storage(&self.client, content_type, filename).await
    }

    async fn upload(
        &self,
        handle: &RemoteFileHandle,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), IndexError> {
        upload::upload_bytes(&self.client, handle, content_type, data).await
    }

    async fn attach(&self, file_id: &str) -> Result<(), IndexError> {
        upload::attach_files(&self.client, &self.rag_id, &[file_id]).await
    }
}
