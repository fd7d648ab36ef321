//! Notification lifecycle: persistence plus live fan-out of new records.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;
use notifyhub_database::NotificationStore;
use notifyhub_entity::notification::{
    NewNotification, Notification, NotificationChanges, NotificationFilter,
};
use notifyhub_realtime::HubHandle;

use super::presenter::{NotificationPresenter, NotificationView};

/// One notification addressed to several users.
#[derive(Debug, Clone)]
pub struct CreateNotifications {
    pub application: String,
    pub name: String,
    pub url: String,
    pub message: String,
    pub user_ids: Vec<Uuid>,
    pub created_by: Uuid,
}

/// Manages notification records and pushes new ones to live sessions.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification store.
    store: Arc<dyn NotificationStore>,
    /// Display name resolution.
    presenter: NotificationPresenter,
    /// Live fan-out.
    hub: HubHandle,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("presenter", &self.presenter)
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        presenter: NotificationPresenter,
        hub: HubHandle,
    ) -> Self {
        Self {
            store,
            presenter,
            hub,
        }
    }

    /// Creates one record per recipient and broadcasts each to its owner's
    /// open sessions. Stops at the first store failure.
    pub async fn create(&self, input: CreateNotifications) -> AppResult<Vec<Notification>> {
        if input.user_ids.is_empty() {
            return Err(AppError::validation("user_ids cannot be empty"));
        }

        let mut created = Vec::with_capacity(input.user_ids.len());
        for user_id in &input.user_ids {
            let notification = self
                .store
                .create(NewNotification {
                    application: input.application.clone(),
                    name: input.name.clone(),
                    url: input.url.clone(),
                    message: input.message.clone(),
                    user_id: *user_id,
                    created_by: input.created_by,
                })
                .await?;

            let unread_count = self
                .store
                .count_unread(*user_id, &notification.application)
                .await?;
            let event = self.presenter.event(notification.clone(), unread_count).await;
            self.hub.broadcast(event);
            created.push(notification);
        }

        info!(
            application = %input.application,
            recipients = created.len(),
            created_by = %input.created_by,
            "Notifications created"
        );
        Ok(created)
    }

    /// Lists notifications matching a filter.
    pub async fn list(&self, filter: &NotificationFilter) -> AppResult<Vec<NotificationView>> {
        let found = self.store.find_by_filter(filter).await?;
        Ok(self.presenter.present_all(found).await)
    }

    /// Lists every notification.
    pub async fn all(&self) -> AppResult<Vec<NotificationView>> {
        let found = self.store.find_all().await?;
        Ok(self.presenter.present_all(found).await)
    }

    /// Lists a user's notifications.
    pub async fn by_user(&self, user_id: Uuid) -> AppResult<Vec<NotificationView>> {
        self.list(&NotificationFilter::for_user(user_id)).await
    }

    /// Gets one notification.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<NotificationView> {
        let notification = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        Ok(self.presenter.present(notification).await)
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        id: Uuid,
        changes: NotificationChanges,
    ) -> AppResult<NotificationView> {
        let updated = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        info!(notification_id = %id, "Notification updated");
        Ok(self.presenter.present(updated).await)
    }

    /// Soft-deletes a notification.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.soft_delete(id).await? {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        info!(notification_id = %id, "Notification deleted");
        Ok(())
    }

    /// Counts a user's unread notifications in one application, or all
    /// applications when `application` is empty.
    pub async fn count_unread(&self, user_id: Uuid, application: &str) -> AppResult<i64> {
        self.store.count_unread(user_id, application).await
    }
}
