//! Object-store domain types
//!
//! [`ObjectKey`] is a validated key inside the bucket, [`ObjectDescriptor`]
//! is one entry of a listing pass and [`ObjectPage`] is one page of that
//! listing. Descriptors are produced fresh by every pass and never stored.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// ObjectKey
// ============================================================================

/// Full key of an object within the bucket (e.g. `docs/guides/intro.pdf`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey
    ///
    /// # Errors
    /// Returns error if the key is empty or names a directory placeholder
    pub fn new(key: String) -> Result<Self, DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidObjectKey(
                "Object key cannot be empty".to_string(),
            ));
        }
        if key.ends_with('/') {
            return Err(DomainError::InvalidObjectKey(format!(
                "Object key names a directory placeholder: {key}"
            )));
        }
        Ok(Self(key))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the key, used as the upload filename
    #[must_use]
    pub fn file_name(&self) -> &str {
        file_name_of(&self.0)
    }

    /// MIME type derived from the key's extension
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.0)
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

// ============================================================================
// ObjectDescriptor / ObjectPage
// ============================================================================

/// One object found while listing the bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Object key (unique within the bucket)
    pub key: ObjectKey,
    /// Object size in bytes as reported by the listing
    pub size: i64,
    /// Last modification timestamp
    pub modified: DateTime<Utc>,
    /// Entity tag, stripped of surrounding quotes
    pub etag: Option<String>,
}

impl ObjectDescriptor {
    /// Creates a descriptor without an entity tag
    pub fn new(key: ObjectKey, size: i64, modified: DateTime<Utc>) -> Self {
        Self {
            key,
            size,
            modified,
            etag: None,
        }
    }
}

/// A single page of a bucket listing
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Objects on this page, in listing order
    pub objects: Vec<ObjectDescriptor>,
    /// Continuation token for the next page (None on the last page)
    pub next_token: Option<String>,
}

impl ObjectPage {
    /// Returns true if no further pages follow this one
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

// ============================================================================
// Key helpers
// ============================================================================

/// Normalizes a configured key prefix
///
/// Leading and trailing `/` separators are stripped, so `"/docs/"` and
/// `"docs"` select the same objects. An empty result means "whole bucket".
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_matches('/').to_string()
}

/// Returns the basename of an object key
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Detects a MIME content type from the key's file extension
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn content_type_for(key: &str) -> &'static str {
    let name = file_name_of(key);
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return "application/octet-stream",
    };

    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}
