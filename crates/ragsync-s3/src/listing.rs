//! `ListObjectsV2` response parsing
//!
//! The XML body is deserialized with `quick-xml`'s serde support into
//! [`ListBucketResult`], then converted to a domain [`ObjectPage`].

use chrono::{DateTime, Utc};
use ragsync_core::domain::{ObjectDescriptor, ObjectKey, ObjectPage};
use serde::Deserialize;
use tracing::debug;

use crate::S3Error;

/// Raw `ListBucketResult` document (only the fields we use)
#[derive(Debug, Deserialize)]
pub struct ListBucketResult {
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextContinuationToken")]
    pub next_continuation_token: Option<String>,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ListEntry>,
}

/// One `<Contents>` element
#[derive(Debug, Deserialize)]
pub struct ListEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size", default)]
    pub size: i64,
    #[serde(rename = "LastModified")]
    pub last_modified: Option<String>,
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
}

/// Parses a `ListObjectsV2` body into an [`ObjectPage`]
///
/// Directory placeholder keys (ending in `/`) are dropped. The next token
/// is only kept when the listing is truncated.
pub fn parse_list_response(xml: &str) -> Result<ObjectPage, S3Error> {
    let raw: ListBucketResult =
        quick_xml::de::from_str(xml).map_err(|e| S3Error::InvalidListing(e.to_string()))?;

    let mut objects = Vec::with_capacity(raw.contents.len());
    for entry in raw.contents {
        let key = match ObjectKey::new(entry.key) {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "Skipping listing entry");
                continue;
            }
        };

        let modified = entry
            .last_modified
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();

        let mut descriptor = ObjectDescriptor::new(key, entry.size, modified);
        descriptor.etag = entry
            .etag
            .map(|e| e.trim_matches('"').to_string())
            .filter(|e| !e.is_empty());
        objects.push(descriptor);
    }

    let next_token = if raw.is_truncated {
        match raw.next_continuation_token.filter(|t| !t.is_empty()) {
            Some(token) => Some(token),
            None => {
                return Err(S3Error::InvalidListing(
                    "truncated listing without NextContinuationToken".to_string(),
                ))
            }
        }
    } else {
        None
    };

    Ok(ObjectPage {
        objects,
        next_token,
    })
}
