//! Integration tests for upload-target requests

use ragsync_core::ports::{IIndexService, IndexError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_request_storage_sends_content_type_and_filename() {
    let (server, provider) = common::setup_index_mock().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/storage"))
        .and(body_json(json!({
            "contentType": "application/pdf",
            "filename": "b.pdf"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://uploads.example/b.pdf?sig=1",
            "file_id": "file-b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = provider
        .request_storage("application/pdf", "b.pdf")
        .await
        .expect("storage request failed");

    assert_eq!(handle.upload_target, "https://uploads.example/b.pdf?sig=1");
    assert_eq!(handle.file_id.as_deref(), Some("file-b"));
}

#[tokio::test]
async fn test_request_storage_accepts_alias_fields() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_storage(
        &server,
        201,
        json!({"presignedUrl": "https://uploads.example/x", "fileId": "f-9"}),
    )
    .await;

    let handle = provider
        .request_storage("text/plain", "x.txt")
        .await
        .expect("storage request failed");
    assert_eq!(handle.upload_target, "https://uploads.example/x");
    assert_eq!(handle.file_id.as_deref(), Some("f-9"));
}

#[tokio::test]
async fn test_request_storage_without_upload_url() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_storage(&server, 200, json!({"file_id": "f-1"})).await;

    let err = provider
        .request_storage("text/plain", "a.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::MissingUploadUrl));
}

#[tokio::test]
async fn test_request_storage_non_json_body() {
    let (server, provider) = common::setup_index_mock().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/storage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = provider
        .request_storage("text/plain", "a.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_request_storage_error_status() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_storage(&server, 401, json!({"error": "invalid api key"})).await;

    let err = provider
        .request_storage("text/plain", "a.txt")
        .await
        .unwrap_err();
    match err {
        IndexError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_storage_transport_failure() {
    let (server, provider) = common::setup_index_mock().await;
    drop(server);

    let err = provider
        .request_storage("text/plain", "a.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Transport(_)));
}
