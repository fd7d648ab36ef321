//! Broker request handlers backed by the notification service.

use async_trait::async_trait;
use serde_json::{Map, Value};

use notifyhub_core::result::AppResult;
use notifyhub_messaging::envelope::CountUnreadPayload;
use notifyhub_messaging::{Envelope, RequestHandler};

use super::service::NotificationService;

/// Answers `count_unread_notifications` with `{"count": n}`.
#[derive(Debug, Clone)]
pub struct CountUnreadHandler {
    service: NotificationService,
}

impl CountUnreadHandler {
    pub fn new(service: NotificationService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RequestHandler for CountUnreadHandler {
    async fn handle(&self, request: &Envelope) -> AppResult<Map<String, Value>> {
        let payload: CountUnreadPayload = request.decode_data()?;
        let count = self
            .service
            .count_unread(payload.user_id, &payload.application)
            .await?;

        let mut reply = Map::new();
        reply.insert("count".to_string(), Value::from(count));
        Ok(reply)
    }
}
