//! ragsync Core - Domain types, configuration and port definitions
//!
//! This crate contains the pieces every other ragsync crate agrees on:
//! - **Domain types** - `ObjectKey`, `ObjectDescriptor`, `SyncPassResult`
//! - **Port definitions** - Traits for adapters: `IObjectStore`, `IIndexService`
//! - **Configuration** - Typed config with YAML + environment loading
//!
//! # Architecture
//!
//! The crate follows the ports & adapters layout. Domain types carry no
//! I/O. Ports define the trait interfaces that adapter crates
//! (`ragsync-s3`, `ragsync-index`) implement and that the sync engine
//! consumes.

pub mod config;
pub mod domain;
pub mod ports;
