//! Domain entities
//!
//! - Validated object keys and listing descriptors
//! - Per-pass sync results
//! - Domain-specific error types

pub mod errors;
pub mod object;
pub mod pass;

pub use errors::DomainError;
pub use object::{content_type_for, file_name_of, normalize_prefix, ObjectDescriptor, ObjectKey, ObjectPage};
pub use pass::{PassId, PassTrigger, SyncPassResult};
