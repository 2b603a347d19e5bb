//! Upload-target provisioning
//!
//! `POST /api/v1/storage` returns a JSON object whose field names have
//! varied between service versions. Instead of a fixed schema the response
//! is read as a [`serde_json::Value`] and each field is resolved through an
//! ordered list of candidate names; the first present, non-empty candidate
//! wins.

use ragsync_core::ports::{IndexError, RemoteFileHandle};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{check_status, transport, IndexClient};

/// API path for upload-target requests
pub const STORAGE_PATH: &str = "/api/v1/storage";

/// Candidate field names for the upload URL, in priority order
pub const UPLOAD_URL_FIELDS: &[&str] = &[
    "url",
    "presigned_url",
    "upload_url",
    "uploadUrl",
    "presignedUrl",
];

/// Candidate field names for the file identifier, in priority order
pub const FILE_ID_FIELDS: &[&str] = &["file_id", "fileId", "id"];

/// Request body for `POST /api/v1/storage`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRequest<'a> {
    /// MIME type the bytes will be uploaded with
    pub content_type: &'a str,
    /// Basename of the object key
    pub filename: &'a str,
}

/// Requests an upload target for one object
///
/// # Errors
/// Transport failures, non-2xx statuses, non-JSON bodies and responses
/// without an upload URL are all returned as [`IndexError`].
pub async fn request_storage(
    client: &IndexClient,
    content_type: &str,
    filename: &str,
) -> Result<RemoteFileHandle, IndexError> {
    debug!(filename, content_type, "Requesting upload target");

    let response = client
        .request(Method::POST, STORAGE_PATH)
        .json(&StorageRequest {
            content_type,
            filename,
        })
        .send()
        .await
        .map_err(transport)?;

    let body = check_status(response)
        .await?
        .text()
        .await
        .map_err(transport)?;

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        IndexError::InvalidResponse(format!("storage response is not JSON: {e}"))
    })?;

    let handle = parse_storage_response(&value)?;
    debug!(
        file_id = handle.file_id.as_deref().unwrap_or("<none>"),
        "Upload target received"
    );
    Ok(handle)
}

/// Extracts the upload URL and optional file id from a storage response
pub fn parse_storage_response(value: &Value) -> Result<RemoteFileHandle, IndexError> {
    if !value.is_object() {
        return Err(IndexError::InvalidResponse(
            "storage response is not a JSON object".to_string(),
        ));
    }

    let upload_target = first_string(value, UPLOAD_URL_FIELDS).ok_or(IndexError::MissingUploadUrl)?;
    let file_id = first_string(value, FILE_ID_FIELDS);

    Ok(RemoteFileHandle {
        file_id,
        upload_target,
    })
}

/// Returns the first candidate field holding a non-empty string or a number
fn first_string(value: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|name| match value.get(*name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
