//! Domain error types
//!
//! Validation failures raised while constructing domain values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Object key is empty or otherwise unusable
    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),
}
