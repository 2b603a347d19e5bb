//! HTTP control surface
//!
//! Serves JSON endpoints for operators:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET  | `/health` | service identity, bucket, index API, scheduler state |
//! | POST | `/api/v1/sync` | `202`, starts a pass without waiting for it |
//! | GET  | `/api/v1/stats` | processed count and configuration echo |
//! | GET  | `/api/v1/processed-files` | sorted processed keys |
//!
//! The `/api/v1` routes are also answered without the prefix.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use ragsync_sync::scheduler::SyncScheduler;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "ragsync";

/// Configuration echoed by the control surface
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub bucket: String,
    pub prefix: String,
    pub index_api: String,
    pub interval: Duration,
    pub max_file_size_mb: u64,
}

/// Shared state behind every request
pub struct ControlState {
    scheduler: Arc<SyncScheduler>,
    info: ServiceInfo,
}

impl ControlState {
    pub fn new(scheduler: Arc<SyncScheduler>, info: ServiceInfo) -> Self {
        Self { scheduler, info }
    }
}

/// HTTP server for the control surface
pub struct ControlServer {
    listener: TcpListener,
    state: Arc<ControlState>,
    grace: Duration,
}

impl ControlServer {
    /// Binds the listener
    ///
    /// # Arguments
    /// * `addr` - Address to bind; port 0 picks a free port
    /// * `state` - Shared request state
    /// * `grace` - How long open connections may finish after shutdown
    pub async fn bind(
        addr: SocketAddr,
        state: Arc<ControlState>,
        grace: Duration,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state,
            grace,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until `shutdown` is cancelled
    ///
    /// On shutdown the listener stops accepting, open connections are
    /// asked to close after their current request, and the server waits
    /// up to the grace period for them.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let addr = self.local_addr()?;
        info!(%addr, "Control server listening");

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);
                    let conn_shutdown = shutdown.child_token();

                    connections.spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(req, &state) }
                        });

                        let conn = http1::Builder::new().serve_connection(io, service);
                        tokio::pin!(conn);

                        let result = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = conn_shutdown.cancelled() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(e) = result {
                            error!(%peer, error = %e, "Control HTTP connection error");
                        }
                    });
                }
                // Reap finished connection tasks
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.cancelled() => {
                    info!("Control server shutting down");
                    break;
                }
            }
        }

        drop(self.listener);

        let open = connections.len();
        if open > 0 {
            debug!(open, grace_secs = self.grace.as_secs(), "Waiting for open connections");
            let drained = tokio::time::timeout(self.grace, async {
                while connections.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                warn!(
                    remaining = connections.len(),
                    "Grace period elapsed, closing remaining connections"
                );
                connections.abort_all();
            }
        }

        info!("Control server stopped");
        Ok(())
    }
}

/// Handle a single HTTP request.
fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: &ControlState,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = route(req.method(), req.uri().path(), state);
    debug!(
        method = %req.method(),
        path = req.uri().path(),
        status = response.status().as_u16(),
        "Control request"
    );
    Ok(response)
}

/// Dispatches a request by method and path
pub fn route(method: &Method, path: &str, state: &ControlState) -> Response<Full<Bytes>> {
    let path = path.trim_end_matches('/');
    let endpoint = path.strip_prefix("/api/v1").unwrap_or(path);

    match (endpoint, path) {
        (_, "/health") => only(method, Method::GET, || health(state)),
        ("/sync", _) => only(method, Method::POST, || trigger_sync(state)),
        ("/stats", _) => only(method, Method::GET, || stats(state)),
        ("/processed-files", _) => only(method, Method::GET, || processed_files(state)),
        _ => json_response(StatusCode::NOT_FOUND, &json!({"error": "not found"})),
    }
}

fn only<F>(method: &Method, allowed: Method, handler: F) -> Response<Full<Bytes>>
where
    F: FnOnce() -> Response<Full<Bytes>>,
{
    if *method == allowed {
        handler()
    } else {
        let mut response = json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({"error": "method not allowed"}),
        );
        if let Ok(value) = HeaderValue::from_str(allowed.as_str()) {
            response.headers_mut().insert(hyper::header::ALLOW, value);
        }
        response
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn health(state: &ControlState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "s3_bucket": state.info.bucket,
            "index_api": state.info.index_api,
            "scheduler": state.scheduler.state(),
        }),
    )
}

fn trigger_sync(state: &ControlState) -> Response<Full<Bytes>> {
    let pass = state.scheduler.trigger();
    info!(pass_id = %pass.pass_id, "Sync triggered via control surface");
    json_response(
        StatusCode::ACCEPTED,
        &json!({
            "message": "Sync triggered",
            "status": "started",
            "pass_id": pass.pass_id,
        }),
    )
}

fn stats(state: &ControlState) -> Response<Full<Bytes>> {
    let processed = state.scheduler.engine().state().count();
    json_response(
        StatusCode::OK,
        &json!({
            "processed_files": processed,
            "s3_bucket": state.info.bucket,
            "s3_prefix": state.info.prefix,
            "sync_interval_seconds": state.info.interval.as_secs(),
            "sync_interval_minutes": state.info.interval.as_secs_f64() / 60.0,
            "max_file_size_mb": state.info.max_file_size_mb,
            "scheduler": state.scheduler.state(),
        }),
    )
}

fn processed_files(state: &ControlState) -> Response<Full<Bytes>> {
    let files = state.scheduler.engine().state().snapshot();
    let count = files.len();
    json_response(StatusCode::OK, &json!({"files": files, "count": count}))
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
