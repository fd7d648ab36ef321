//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use notifyhub_entity::notification::Notification;
use notifyhub_service::NotificationView;

use crate::dto::request::{
    CreateNotificationRequest, ListNotificationsQuery, UnreadCountQuery,
    UpdateNotificationRequest,
};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::extractors::path::parse_uuid;
use crate::state::AppState;

/// GET /api/v1/notifications?application=&user_id=&read_at=YES|NO
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    let filter = query.into_filter()?;
    let items = state.notifications.list(&filter).await?;
    Ok(Json(ApiResponse::ok("Notifications retrieved", items)))
}

/// GET /api/v1/notifications/all
pub async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    let items = state.notifications.all().await?;
    Ok(Json(ApiResponse::ok("Notifications retrieved", items)))
}

/// GET /api/v1/notifications/user/{user_id}
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    let user_id = parse_uuid(&user_id)?;
    let items = state.notifications.by_user(user_id).await?;
    Ok(Json(ApiResponse::ok("Notifications retrieved", items)))
}

/// GET /api/v1/notifications/unread/count?user_id=&application=
pub async fn unread_count(
    State(state): State<AppState>,
    Query(query): Query<UnreadCountQuery>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let (user_id, application) = query.parse()?;
    let count = state.notifications.count_unread(user_id, &application).await?;
    Ok(Json(ApiResponse::ok(
        "Unread notifications counted",
        CountResponse { count },
    )))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NotificationView>>, ApiError> {
    let id = parse_uuid(&id)?;
    let item = state.notifications.find_by_id(id).await?;
    Ok(Json(ApiResponse::ok("Notification retrieved", item)))
}

/// POST /api/v1/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateNotificationRequest>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, ApiError> {
    let created = state.notifications.create(req.into()).await?;
    Ok(Json(ApiResponse::ok("Notifications created", created)))
}

/// PUT /api/v1/notifications/update
pub async fn update_notification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateNotificationRequest>,
) -> Result<Json<ApiResponse<NotificationView>>, ApiError> {
    let (id, changes) = req.into_changes();
    let item = state.notifications.update(id, changes).await?;
    Ok(Json(ApiResponse::ok("Notification updated", item)))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Uuid>>, ApiError> {
    let id = parse_uuid(&id)?;
    state.notifications.delete(id).await?;
    Ok(Json(ApiResponse::ok("Notification deleted", id)))
}
