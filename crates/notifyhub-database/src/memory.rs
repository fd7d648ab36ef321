//! In-memory notification store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use notifyhub_core::result::AppResult;
use notifyhub_entity::notification::{
    NewNotification, Notification, NotificationChanges, NotificationFilter,
};

use crate::store::NotificationStore;

/// Process-local store with the same visibility rules as the PostgreSQL one.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    rows: RwLock<HashMap<Uuid, Notification>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, input: NewNotification) -> AppResult<Notification> {
        let notification = Notification::from_new(input);
        self.rows
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|n| !n.is_deleted()).cloned())
    }

    async fn find_by_filter(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Notification> = rows
            .values()
            .filter(|n| !n.is_deleted() && filter.matches(n))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &NotificationChanges,
    ) -> AppResult<Option<Notification>> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(n) if !n.is_deleted() => {
                n.apply(changes);
                Ok(Some(n.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(n) if !n.is_deleted() => {
                n.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_unread(&self, user_id: Uuid, application: &str) -> AppResult<i64> {
        let rows = self.rows.read().await;
        let count = rows
            .values()
            .filter(|n| {
                !n.is_deleted()
                    && n.is_unread()
                    && n.user_id == user_id
                    && (application.is_empty() || n.application == application)
            })
            .count();
        Ok(count as i64)
    }
}
