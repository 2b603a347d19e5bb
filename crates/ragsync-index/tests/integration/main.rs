//! Integration tests for ragsync-index
//!
//! Uses wiremock to simulate the remote indexing service and verifies the
//! storage request, byte upload and attach calls end to end.

mod common;

mod test_storage;
mod test_upload_attach;
