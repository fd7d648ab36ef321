//! Resolution of user display names for outgoing notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use notifyhub_core::traits::UserLookup;
use notifyhub_entity::notification::Notification;
use notifyhub_realtime::NotificationEvent;

/// Name shown when the user directory cannot answer.
pub const UNKNOWN_USER: &str = "Unknown";

/// A notification record with display names attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Turns records into views and events.
#[derive(Clone)]
pub struct NotificationPresenter {
    users: Arc<dyn UserLookup>,
}

impl std::fmt::Debug for NotificationPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPresenter").finish()
    }
}

impl NotificationPresenter {
    /// Create a presenter over a user lookup.
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self { users }
    }

    /// Display name of a user, or `"Unknown"` if the lookup fails.
    pub async fn display_name(&self, user_id: Uuid) -> String {
        match self.users.find_user_by_id(user_id).await {
            Ok(user) => user.name,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to resolve user name");
                UNKNOWN_USER.to_string()
            }
        }
    }

    async fn names(&self, notification: &Notification) -> (String, String) {
        tokio::join!(
            self.display_name(notification.user_id),
            self.display_name(notification.created_by)
        )
    }

    /// Attach display names to one record.
    pub async fn present(&self, notification: Notification) -> NotificationView {
        let (user_name, created_by_name) = self.names(&notification).await;
        NotificationView {
            id: notification.id,
            application: notification.application,
            name: notification.name,
            url: notification.url,
            read_at: notification.read_at,
            message: notification.message,
            user_id: notification.user_id,
            created_by: notification.created_by,
            user_name,
            created_by_name,
            created_at: notification.created_at,
            updated_at: notification.updated_at,
        }
    }

    /// Attach display names to many records, preserving order.
    pub async fn present_all(&self, notifications: Vec<Notification>) -> Vec<NotificationView> {
        futures::future::join_all(notifications.into_iter().map(|n| self.present(n))).await
    }

    /// Build the live event for a freshly created record.
    pub async fn event(&self, notification: Notification, unread_count: i64) -> NotificationEvent {
        let view = self.present(notification).await;
        NotificationEvent {
            id: view.id,
            application: view.application,
            name: view.name,
            url: view.url,
            read_at: view.read_at,
            message: view.message,
            user_id: view.user_id,
            created_by: view.created_by,
            user_name: view.user_name,
            created_by_name: view.created_by_name,
            unread_count,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}
