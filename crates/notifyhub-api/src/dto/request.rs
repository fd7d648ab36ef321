//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use notifyhub_core::error::AppError;
use notifyhub_entity::notification::{
    Application, NotificationChanges, NotificationFilter, ReadState,
};
use notifyhub_service::CreateNotifications;

use crate::extractors::path::parse_uuid;

/// Create notification request. One record is stored per recipient.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Originating application.
    #[validate(custom(function = "validate_application"))]
    pub application: String,
    /// Title.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Link target.
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    /// Body text.
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    /// Recipients.
    #[validate(length(min = 1, message = "user_ids cannot be empty"))]
    pub user_ids: Vec<Uuid>,
    /// Sender.
    pub created_by: Uuid,
}

impl From<CreateNotificationRequest> for CreateNotifications {
    fn from(req: CreateNotificationRequest) -> Self {
        Self {
            application: req.application,
            name: req.name,
            url: req.url,
            message: req.message,
            user_ids: req.user_ids,
            created_by: req.created_by,
        }
    }
}

/// Partial update request. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateNotificationRequest {
    /// Record to update.
    pub id: Uuid,
    #[validate(custom(function = "validate_application"))]
    pub application: Option<String>,
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "url must be a valid URL"))]
    pub url: Option<String>,
    #[validate(length(min = 1, message = "message cannot be empty"))]
    pub message: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
}

impl UpdateNotificationRequest {
    /// Split into the target id and the changes to apply.
    pub fn into_changes(self) -> (Uuid, NotificationChanges) {
        (
            self.id,
            NotificationChanges {
                application: self.application,
                name: self.name,
                url: self.url,
                message: self.message,
                read_at: self.read_at,
            },
        )
    }
}

/// Query parameters for `GET /api/v1/notifications`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Exact application match.
    pub application: Option<String>,
    /// Recipient.
    pub user_id: Option<String>,
    /// `YES` for read, `NO` for unread.
    pub read_at: Option<String>,
}

impl ListNotificationsQuery {
    /// Parse into a store filter. Empty parameters are ignored.
    pub fn into_filter(self) -> Result<NotificationFilter, AppError> {
        let application = self.application.filter(|a| !a.is_empty());
        let user_id = match self.user_id.filter(|u| !u.is_empty()) {
            Some(raw) => Some(parse_uuid(&raw)?),
            None => None,
        };
        let read = match self.read_at.filter(|r| !r.is_empty()) {
            Some(raw) => Some(raw.parse::<ReadState>()?),
            None => None,
        };
        Ok(NotificationFilter {
            application,
            user_id,
            read,
        })
    }
}

/// Query parameters for `GET /api/v1/notifications/unread/count`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnreadCountQuery {
    /// User whose unread records are counted. Required.
    pub user_id: Option<String>,
    /// Application to count in. Empty or absent counts all applications.
    pub application: Option<String>,
}

impl UnreadCountQuery {
    /// Validated `(user_id, application)` pair.
    pub fn parse(self) -> Result<(Uuid, String), AppError> {
        let raw = self
            .user_id
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::validation("user_id is required"))?;
        Ok((parse_uuid(&raw)?, self.application.unwrap_or_default()))
    }
}

fn validate_application(value: &str) -> Result<(), ValidationError> {
    value.parse::<Application>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("application");
        err.message = Some("application must be one of MANPOWER, RECRUITMENT, ONBOARDING".into());
        err
    })
}
