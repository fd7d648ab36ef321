//! Liveness endpoints.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<ApiResponse<()>> {
    Json(ApiResponse::ok("Welcome to the notification service", ()))
}

/// GET /health, with the number of open WebSocket sessions.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ws_clients: state.hub.client_count().await,
    };
    Json(ApiResponse::ok("ok", body))
}
