//! Byte upload and collection attach
//!
//! - [`upload_bytes`]: `PUT` the raw object body to the pre-signed target
//! - [`attach_files`]: `POST /api/v1/rags/{rag_id}/files` with `{"file_ids": [...]}`
//!
//! Attach is the commit point of a transfer; a file that was uploaded but
//! never attached is invisible to the collection.

use ragsync_core::ports::{IndexError, RemoteFileHandle};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::client::{check_status, transport, IndexClient};

/// Request body for the attach call
#[derive(Debug, Serialize)]
pub struct AttachRequest<'a> {
    pub file_ids: &'a [&'a str],
}

/// Builds the attach path for a collection
pub fn attach_path(rag_id: &str) -> String {
    format!("/api/v1/rags/{rag_id}/files")
}

/// Uploads the object bytes to a pre-signed target
///
/// # Arguments
/// * `client` - Client whose timeout applies; the API key is not sent
/// * `handle` - Target from the storage request
/// * `content_type` - Same MIME type that was used to request the target
/// * `data` - Full object body
pub async fn upload_bytes(
    client: &IndexClient,
    handle: &RemoteFileHandle,
    content_type: &str,
    data: &[u8],
) -> Result<(), IndexError> {
    debug!(bytes = data.len(), content_type, "Uploading object bytes");

    let response = client
        .request_absolute(Method::PUT, &handle.upload_target)
        .header("Content-Type", content_type)
        .body(data.to_vec())
        .send()
        .await
        .map_err(transport)?;

    check_status(response).await?;
    Ok(())
}

/// Attaches uploaded files to a collection
///
/// Any 2xx status is success. 413 is classified as
/// [`IndexError::PayloadTooLarge`].
pub async fn attach_files(
    client: &IndexClient,
    rag_id: &str,
    file_ids: &[&str],
) -> Result<(), IndexError> {
    let path = attach_path(rag_id);
    debug!(rag_id, files = file_ids.len(), "Attaching files to collection");

    let response = client
        .request(Method::POST, &path)
        .json(&AttachRequest { file_ids })
        .send()
        .await
        .map_err(transport)?;

    check_status(response).await?;
    Ok(())
}
