//! Shared test helpers for indexing service integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server; the provider
//! returned by [`setup_index_mock`] points at that server.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragsync_index::{IndexClient, IndexServiceProvider};

/// API key every mocked API endpoint expects
pub const API_KEY: &str = "test-api-key";

/// Collection id used by the tests
pub const RAG_ID: &str = "rag-test-001";

/// Starts a mock server and returns a provider bound to [`RAG_ID`]
pub async fn setup_index_mock() -> (MockServer, IndexServiceProvider) {
    let server = MockServer::start().await;
    let client = IndexClient::with_base_url(API_KEY, server.uri());
    (server, IndexServiceProvider::new(client, RAG_ID))
}

/// Mounts `POST /api/v1/storage` answering with `body`
pub async fn mount_storage(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/storage"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Upload URL on the mock server for a given upload name
pub fn upload_url(server: &MockServer, name: &str) -> String {
    format!("{}/uploads/{name}", server.uri())
}

/// Mounts `PUT /uploads/{name}` answering with `status`
pub async fn mount_upload(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(path(format!("/uploads/{name}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts the attach endpoint for [`RAG_ID`] answering with `status`
pub async fn mount_attach(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/rags/{RAG_ID}/files")))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status < 300})))
        .mount(server)
        .await;
}
