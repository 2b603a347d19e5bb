//! ragsync Daemon - process wiring and operator control surface
//!
//! ## Modules
//!
//! - [`app`] - Builds adapters, engine and scheduler from configuration
//! - [`server`] - HTTP control surface (health, stats, trigger, processed keys)

pub mod app;
pub mod server;
