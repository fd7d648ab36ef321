//! Notification event pushed to connected clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A newly created notification, as seen by its recipient's open sessions.
///
/// Serialized as one JSON text frame per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub application: String,
    pub name: String,
    pub url: String,
    pub read_at: Option<DateTime<Utc>>,
    pub message: String,
    pub user_id: Uuid,
    pub created_by: Uuid,
    pub user_name: String,
    pub created_by_name: String,
    /// Recipient's unread count in `application`, this one included.
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
impl NotificationEvent {
    /// Minimal event for `user_id` in `application`.
    pub(crate) fn for_test(user_id: Uuid, application: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            application: application.to_string(),
            name: "Interview scheduled".to_string(),
            url: "https://hr.example.com/interviews/1".to_string(),
            read_at: None,
            message: "Tomorrow 10:00".to_string(),
            user_id,
            created_by: Uuid::new_v4(),
            user_name: "Unknown".to_string(),
            created_by_name: "Unknown".to_string(),
            unread_count: 1,
            created_at: now,
            updated_at: now,
        }
    }
}
