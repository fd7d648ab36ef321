//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use notifyhub_core::error::AppError;
use notifyhub_realtime::session;

use crate::error::ApiError;
use crate::extractors::path::parse_uuid;
use crate::state::AppState;

/// Query parameters identifying the subscriber.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Recipient whose notifications are pushed. Required.
    pub user_id: Option<String>,
    /// Restrict delivery to one application. Empty means all.
    pub app_type: Option<String>,
}

/// GET /ws?user_id={uuid}&app_type={application}
///
/// The subscriber is checked before the upgrade so a bad request gets a
/// plain 400 instead of a socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let raw = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("user_id is required"))?;
    let user_id = parse_uuid(&raw)?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let hub = state.hub.clone();
    let buffer = state.config.realtime.client_buffer_size;
    let app_type = query.app_type;

    Ok(ws.on_upgrade(move |socket| session::serve(socket, hub, user_id, app_type, buffer)))
}
