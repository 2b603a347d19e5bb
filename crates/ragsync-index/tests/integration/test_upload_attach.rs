//! Integration tests for byte upload and collection attach

use ragsync_core::ports::{IIndexService, IndexError, RemoteFileHandle};
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_upload_puts_raw_bytes_without_api_key() {
    let (server, provider) = common::setup_index_mock().await;

    Mock::given(method("PUT"))
        .and(path("/uploads/a.txt"))
        .and(header("content-type", "text/plain"))
        .and(body_bytes(b"hello".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let handle = RemoteFileHandle {
        file_id: Some("file-a".to_string()),
        upload_target: common::upload_url(&server, "a.txt"),
    };
    provider
        .upload(&handle, "text/plain", b"hello")
        .await
        .expect("upload failed");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_upload_error_status() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_upload(&server, "a.txt", 403).await;

    let handle = RemoteFileHandle {
        file_id: None,
        upload_target: common::upload_url(&server, "a.txt"),
    };
    let err = provider
        .upload(&handle, "text/plain", b"hello")
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Status { status: 403, .. }));
}

#[tokio::test]
async fn test_attach_posts_file_ids() {
    let (server, provider) = common::setup_index_mock().await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/rags/{}/files", common::RAG_ID)))
        .and(body_json(json!({"file_ids": ["file-a"]})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    provider.attach("file-a").await.expect("attach failed");
}

#[tokio::test]
async fn test_attach_payload_too_large() {
    let (server, provider) = common::setup_index_mock().await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/rags/{}/files", common::RAG_ID)))
        .respond_with(ResponseTemplate::new(413).set_body_string("file exceeds 10MB"))
        .mount(&server)
        .await;

    let err = provider.attach("file-a").await.unwrap_err();
    assert!(err.is_payload_too_large());
    assert!(err.to_string().contains("file exceeds 10MB"));
}

#[tokio::test]
async fn test_attach_server_error() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_attach(&server, 500).await;

    let err = provider.attach("file-a").await.unwrap_err();
    assert!(matches!(err, IndexError::Status { status: 500, .. }));
    assert!(!err.is_payload_too_large());
}

#[tokio::test]
async fn test_full_handover() {
    let (server, provider) = common::setup_index_mock().await;
    common::mount_storage(
        &server,
        200,
        json!({"upload_url": common::upload_url(&server, "report.pdf"), "id": "file-r"}),
    )
    .await;
    common::mount_upload(&server, "report.pdf", 200).await;
    common::mount_attach(&server, 200).await;

    let handle = provider
        .request_storage("application/pdf", "report.pdf")
        .await
        .expect("storage request failed");
    provider
        .upload(&handle, "application/pdf", b"%PDF")
        .await
        .expect("upload failed");
    provider
        .attach(handle.file_id_or("docs/report.pdf"))
        .await
        .expect("attach failed");

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
