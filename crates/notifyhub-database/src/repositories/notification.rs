//! PostgreSQL notification store. Deletes are soft.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use notifyhub_core::error::{AppError, ErrorKind};
use notifyhub_core::result::AppResult;
use notifyhub_entity::notification::{
    NewNotification, Notification, NotificationChanges, NotificationFilter, ReadState,
};

use crate::store::NotificationStore;

const COLUMNS: &str = "id, application, name, url, message, user_id, created_by, \
                       read_at, created_at, updated_at, deleted_at";

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// PostgreSQL-backed notification store.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, input: NewNotification) -> AppResult<Notification> {
        let notification = Notification::from_new(input);
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (id, application, name, url, message, user_id, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        ))
        .bind(notification.id)
        .bind(&notification.application)
        .bind(&notification.name)
        .bind(&notification.url)
        .bind(&notification.message)
        .bind(notification.user_id)
        .bind(notification.created_by)
        .bind(notification.created_at)
        .bind(notification.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find notification"))
    }

    async fn find_by_filter(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        let read: Option<bool> = filter.read.map(|r| r == ReadState::Read);
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE deleted_at IS NULL \
               AND ($1::text IS NULL OR application = $1) \
               AND ($2::uuid IS NULL OR user_id = $2) \
               AND ($3::bool IS NULL OR (read_at IS NOT NULL) = $3) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.application.as_deref())
        .bind(filter.user_id)
        .bind(read)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list notifications"))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &NotificationChanges,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET \
                application = COALESCE($2, application), \
                name = COALESCE($3, name), \
                url = COALESCE($4, url), \
                message = COALESCE($5, message), \
                read_at = COALESCE($6, read_at), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(changes.application.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.url.as_deref())
        .bind(changes.message.as_deref())
        .bind(changes.read_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update notification"))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete notification"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_unread(&self, user_id: Uuid, application: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE user_id = $1 AND ($2 = '' OR application = $2) \
               AND read_at IS NULL AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(application)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count unread"))?;
        Ok(count)
    }
}
