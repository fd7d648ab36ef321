//! HTTP routes.
//!
//! Notification routes live under `/api/v1/notifications`. The WebSocket
//! upgrade and the probes sit at the root.

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, put};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, notification, ws};
use crate::middleware::{cors::build_cors_layer, logging::request_logging};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/ws", get(ws::ws_handler))
        .nest("/api/v1/notifications", notifications())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(from_fn(request_logging))
        .with_state(state)
}

fn notifications() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notification::list_notifications).post(notification::create_notification),
        )
        .route("/all", get(notification::list_all))
        .route("/user/{user_id}", get(notification::list_by_user))
        .route("/unread/count", get(notification::unread_count))
        .route("/update", put(notification::update_notification))
        .route(
            "/{id}",
            get(notification::get_notification).delete(notification::delete_notification),
        )
}
