//! Synchronous-style request/reply over the broker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;

use crate::envelope::{BrokerRequest, Envelope};
use crate::publisher::PublisherHandle;
use crate::registry::CorrelationRegistry;

/// Issues requests to peer services and waits for their replies.
#[derive(Debug, Clone)]
pub struct RpcClient {
    registry: Arc<CorrelationRegistry>,
    publisher: PublisherHandle,
    reply_to: String,
    reply_timeout: Duration,
}

/// Removes a registry entry when the waiting future ends for any reason.
struct PendingGuard {
    registry: Arc<CorrelationRegistry>,
    id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

impl RpcClient {
    /// Create a client whose replies come back on `reply_to`.
    pub fn new(
        registry: Arc<CorrelationRegistry>,
        publisher: PublisherHandle,
        reply_to: impl Into<String>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            publisher,
            reply_to: reply_to.into(),
            reply_timeout,
        }
    }

    /// Queue replies are addressed to.
    pub fn reply_to(&self) -> &str {
        &self.reply_to
    }

    /// Send `request` to `queue` and wait for the matching reply.
    ///
    /// The reply window covers queueing for the publisher as well as the
    /// wait itself, so a stalled broker cannot hold the caller past it. The
    /// registry entry is gone when this returns or when the future is
    /// dropped.
    pub async fn send(&self, queue: &str, request: BrokerRequest) -> AppResult<Envelope> {
        let message_type = request.message_type();
        let data = request.into_data()?;
        let id = Uuid::new_v4().to_string();

        let reply_rx = self.registry.register(&id)?;
        let _guard = PendingGuard {
            registry: Arc::clone(&self.registry),
            id: id.clone(),
        };

        let envelope = Envelope::request(id.clone(), message_type.clone(), data, &self.reply_to);
        let exchange = async {
            self.publisher.publish_request(queue, envelope).await?;
            debug!(correlation_id = %id, queue = %queue, message_type = %message_type, "Request sent");
            Self::await_reply(&id, reply_rx).await
        };

        match tokio::time::timeout(self.reply_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    correlation_id = %id,
                    timeout_secs = self.reply_timeout.as_secs_f64(),
                    "Request timeout"
                );
                Err(AppError::timeout("request timeout"))
            }
        }
    }

    async fn await_reply(id: &str, reply_rx: oneshot::Receiver<Envelope>) -> AppResult<Envelope> {
        let reply = reply_rx.await.map_err(|_| {
            AppError::service_unavailable(format!("Reply channel for '{id}' closed"))
        })?;
        debug!(correlation_id = %id, "Received reply");
        Ok(reply)
    }
}
