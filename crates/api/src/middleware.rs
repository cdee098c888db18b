use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Logs one line per request with method, path, status and latency.
pub async fn request_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let res = next.run(req).await;

    let status = res.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if res.status().is_server_error() {
        tracing::warn!(%method, %path, status, latency_ms, "request completed with server error");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request completed");
    }

    res
}
