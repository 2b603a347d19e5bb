//! Port definitions (ports & adapters interfaces)
//!
//! Ports are the interfaces the sync engine depends on, whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IObjectStore`] - Bucket listing and object download (`ragsync-s3`)
//! - [`IIndexService`] - Remote indexing service hand-off (`ragsync-index`)

pub mod index_service;
pub mod object_store;

pub use index_service::{IIndexService, IndexError, RemoteFileHandle};
pub use object_store::IObjectStore;
