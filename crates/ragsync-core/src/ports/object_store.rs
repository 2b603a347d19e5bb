//! Object store port (driven/secondary port)
//!
//! Interface for enumerating and downloading objects from the bucket being
//! mirrored. The primary implementation targets S3 and S3-compatible
//! services, but nothing here is S3-specific.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because listing and download failures are
//!   adapter-specific; the engine only distinguishes *which* call failed.
//! - Listing is exposed one page at a time so the engine can process a
//!   page before asking for the next one. A failure on page N leaves the
//!   outcomes of pages `0..N` intact.

use crate::domain::{ObjectKey, ObjectPage};

/// Port trait for object store operations
#[async_trait::async_trait]
pub trait IObjectStore: Send + Sync {
    /// Name of the bucket this store reads from
    fn bucket(&self) -> &str;

    /// Lists one page of objects under `prefix`
    ///
    /// # Arguments
    /// * `prefix` - Normalized key prefix (empty for the whole bucket)
    /// * `continuation` - Token returned by the previous page, `None` for the first page
    ///
    /// # Returns
    /// The page's objects and the token for the next page, if any
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> anyhow::Result<ObjectPage>;

    /// Downloads an object's full body into memory
    ///
    /// # Arguments
    /// * `key` - The object key to fetch
    async fn get_object(&self, key: &ObjectKey) -> anyhow::Result<Vec<u8>>;
}
