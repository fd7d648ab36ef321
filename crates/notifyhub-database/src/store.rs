//! Storage abstraction for notification records.

use async_trait::async_trait;
use uuid::Uuid;

use notifyhub_core::result::AppResult;
use notifyhub_entity::notification::{
    NewNotification, Notification, NotificationChanges, NotificationFilter,
};

/// Persistence operations over notification records.
///
/// Soft-deleted records are invisible to every read and write.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert a new unread record.
    async fn create(&self, input: NewNotification) -> AppResult<Notification>;

    /// Find a live record by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// List live records matching the filter, newest first.
    async fn find_by_filter(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>>;

    /// List every live record, newest first.
    async fn find_all(&self) -> AppResult<Vec<Notification>> {
        self.find_by_filter(&NotificationFilter::default()).await
    }

    /// Apply a partial update. Returns `None` when no live record has this id.
    async fn update(
        &self,
        id: Uuid,
        changes: &NotificationChanges,
    ) -> AppResult<Option<Notification>>;

    /// Mark a record deleted. Returns `false` when no live record has this id.
    async fn soft_delete(&self, id: Uuid) -> AppResult<bool>;

    /// Count unread records of a user. An empty `application` counts across
    /// all applications.
    async fn count_unread(&self, user_id: Uuid, application: &str) -> AppResult<i64>;
}
