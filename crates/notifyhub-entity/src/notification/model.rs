//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A notification addressed to one user of one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    /// `MANPOWER`, `RECRUITMENT` or `ONBOARDING`.
    pub application: String,
    pub name: String,
    /// Opened when the notification is clicked.
    pub url: String,
    pub message: String,
    /// Recipient.
    pub user_id: Uuid,
    pub created_by: Uuid,
    /// `None` while unread.
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete. Never sent to clients.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Build a fresh, unread record from creation input.
    pub fn from_new(input: NewNotification) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            application: input.application,
            name: input.name,
            url: input.url,
            message: input.message,
            user_id: input.user_id,
            created_by: input.created_by,
            read_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply a partial update in place and refresh `updated_at`.
    pub fn apply(&mut self, changes: &NotificationChanges) {
        let replace = |field: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                field.clone_from(value);
            }
        };
        replace(&mut self.application, &changes.application);
        replace(&mut self.name, &changes.name);
        replace(&mut self.url, &changes.url);
        replace(&mut self.message, &changes.message);
        if changes.read_at.is_some() {
            self.read_at = changes.read_at;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a single notification record.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub application: String,
    pub name: String,
    pub url: String,
    pub message: String,
    pub user_id: Uuid,
    pub created_by: Uuid,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct NotificationChanges {
    pub application: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub message: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
}
