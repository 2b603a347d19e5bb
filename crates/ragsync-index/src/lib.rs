//! ragsync Index - remote document-indexing service client
//!
//! Provides an async client for the three calls that hand one object over
//! to the indexing service:
//! - Requesting a pre-signed upload target (`POST /api/v1/storage`)
//! - Uploading the bytes to that target (`PUT <url>`)
//! - Attaching the uploaded file to a collection (`POST /api/v1/rags/{id}/files`)
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and status classification
//! - [`storage`] - Upload-target request and response field aliasing
//! - [`upload`] - Byte upload and collection attach
//! - [`provider`] - [`IndexServiceProvider`], the `IIndexService` implementation

pub mod client;
pub mod provider;
pub mod storage;
pub mod upload;

pub use client::IndexClient;
pub use provider::IndexServiceProvider;
