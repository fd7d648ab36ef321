//! Outbound publisher loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;

use crate::broker::Broker;
use crate::envelope::Envelope;

/// An envelope addressed to a broker queue.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Destination queue.
    pub queue: String,
    /// Envelope to publish.
    pub envelope: Envelope,
}

/// Cloneable sender side of the publisher's two ingress channels.
#[derive(Debug, Clone)]
pub struct PublisherHandle {
    requests: mpsc::Sender<OutboundMessage>,
    replies: mpsc::Sender<OutboundMessage>,
}

impl PublisherHandle {
    /// Queue a forward request for publishing.
    pub async fn publish_request(&self, queue: &str, envelope: Envelope) -> AppResult<()> {
        self.requests
            .send(OutboundMessage {
                queue: queue.to_string(),
                envelope,
            })
            .await
            .map_err(|_| AppError::service_unavailable("Publisher is not running"))
    }

    /// Queue a reply for publishing.
    pub async fn publish_reply(&self, queue: &str, envelope: Envelope) -> AppResult<()> {
        self.replies
            .send(OutboundMessage {
                queue: queue.to_string(),
                envelope,
            })
            .await
            .map_err(|_| AppError::service_unavailable("Publisher is not running"))
    }
}

/// Serializes queued envelopes and publishes them without confirmation.
pub struct Publisher {
    broker: Arc<dyn Broker>,
    requests: mpsc::Receiver<OutboundMessage>,
    replies: mpsc::Receiver<OutboundMessage>,
}

impl Publisher {
    /// Create a publisher and the handle that feeds it.
    pub fn new(broker: Arc<dyn Broker>, buffer: usize) -> (Self, PublisherHandle) {
        let (requests_tx, requests) = mpsc::channel(buffer.max(1));
        let (replies_tx, replies) = mpsc::channel(buffer.max(1));
        (
            Self {
                broker,
                requests,
                replies,
            },
            PublisherHandle {
                requests: requests_tx,
                replies: replies_tx,
            },
        )
    }

    /// Run until shutdown is signalled or every handle is dropped.
    ///
    /// Both channels share their senders through [`PublisherHandle`], so one
    /// closing means the other has closed too.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!("Publisher loop started");
        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Publisher loop received shutdown signal");
                        break;
                    }
                }
                msg = self.requests.recv() => match msg {
                    Some(msg) => self.publish(msg, "request").await,
                    None => break,
                },
                msg = self.replies.recv() => match msg {
                    Some(msg) => self.publish(msg, "reply").await,
                    None => break,
                },
            }
        }
        info!("Publisher loop stopped");
    }

    async fn publish(&self, msg: OutboundMessage, kind: &'static str) {
        let body = match msg.envelope.to_bytes() {
            Ok(body) => body,
            Err(e) => {
                error!(
                    queue = %msg.queue,
                    correlation_id = %msg.envelope.id,
                    error = %e,
                    "Failed to serialize outbound {kind}"
                );
                return;
            }
        };

        match self.broker.publish(&msg.queue, &body).await {
            Ok(()) => debug!(
                queue = %msg.queue,
                correlation_id = %msg.envelope.id,
                message_type = %msg.envelope.message_type,
                "Published {kind}"
            ),
            Err(e) => error!(
                queue = %msg.queue,
                correlation_id = %msg.envelope.id,
                error = %e,
                "Failed to publish {kind}, dropping"
            ),
        }
    }
}
