//! Access log for every HTTP request.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub async fn request_logging(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().path().to_owned();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(%method, %uri, status, elapsed_ms, "request failed");
    } else {
        tracing::info!(%method, %uri, status, elapsed_ms, "request served");
    }
    response
}
