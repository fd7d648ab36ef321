//! Inbound consumer loop.
//!
//! Reads this service's own queue one delivery at a time. A delivery that
//! does not parse is negatively acknowledged with requeue. Everything else
//! is acknowledged immediately and then routed: replies go to the waiting
//! caller through the [`CorrelationRegistry`], requests go to a
//! [`RequestHandler`] and their answers go back through the publisher.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::broker::{Broker, Delivery};
use crate::envelope::Envelope;
use crate::handler::HandlerRegistry;
use crate::publisher::PublisherHandle;
use crate::registry::{CorrelationRegistry, DeliverOutcome};

/// What happened to a single delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Unparseable; nacked for redelivery.
    Rejected,
    /// Handed to a waiting caller.
    Forwarded,
    /// A reply nobody waits for any more.
    Dropped,
    /// Answered as a request. `replied` is false when there was no reply
    /// destination or the publisher was gone.
    Handled { replied: bool },
}

/// Consumer of one broker queue.
pub struct Consumer {
    broker: Arc<dyn Broker>,
    queue: String,
    registry: Arc<CorrelationRegistry>,
    handlers: HandlerRegistry,
    publisher: PublisherHandle,
}

impl Consumer {
    /// Create a consumer for `queue`.
    pub fn new(
        broker: Arc<dyn Broker>,
        queue: impl Into<String>,
        registry: Arc<CorrelationRegistry>,
        handlers: HandlerRegistry,
        publisher: PublisherHandle,
    ) -> Self {
        Self {
            broker,
            queue: queue.into(),
            registry,
            handlers,
            publisher,
        }
    }

    /// Run until shutdown is signalled or the broker closes.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        info!(queue = %self.queue, "Consumer loop started");
        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!(queue = %self.queue, "Consumer loop received shutdown signal");
                        break;
                    }
                }
                next = self.broker.next_delivery(&self.queue) => match next {
                    Ok(Some(delivery)) => {
                        self.handle_delivery(delivery).await;
                    }
                    Ok(None) => {
                        info!(queue = %self.queue, "Broker closed");
                        break;
                    }
                    Err(e) => {
                        error!(queue = %self.queue, error = %e, "Failed to receive delivery");
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    }
                },
            }
        }
        info!(queue = %self.queue, "Consumer loop stopped");
    }

    /// Process one delivery to completion.
    pub async fn handle_delivery(&self, delivery: Delivery) -> DeliveryOutcome {
        let envelope = match Envelope::from_bytes(&delivery.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(
                    queue = %self.queue,
                    body = %String::from_utf8_lossy(&delivery.body),
                    error = %e,
                    "Failed to parse delivery, requeueing"
                );
                if let Err(e) = self.broker.nack(&delivery, true).await {
                    error!(queue = %self.queue, error = %e, "Failed to nack delivery");
                }
                return DeliveryOutcome::Rejected;
            }
        };

        if let Err(e) = self.broker.ack(&delivery).await {
            error!(queue = %self.queue, error = %e, "Failed to ack delivery");
        }

        let envelope = match self.registry.deliver(envelope) {
            DeliverOutcome::Delivered => return DeliveryOutcome::Forwarded,
            DeliverOutcome::NotPending(envelope) => envelope,
        };

        if envelope.is_reply() {
            debug!(correlation_id = %envelope.id, "Reply for no pending request, dropping");
            return DeliveryOutcome::Dropped;
        }

        let replied = self.answer(envelope).await;
        DeliveryOutcome::Handled { replied }
    }

    async fn answer(&self, request: Envelope) -> bool {
        let reply = match self.handlers.get(&request.message_type) {
            Some(handler) => match handler.handle(&request).await {
                Ok(data) => Envelope::reply(request.id.clone(), data),
                Err(e) => {
                    warn!(
                        correlation_id = %request.id,
                        message_type = %request.message_type,
                        error = %e,
                        "Request handler failed"
                    );
                    Envelope::error_reply(request.id.clone(), e.message)
                }
            },
            None => {
                warn!(
                    correlation_id = %request.id,
                    message_type = %request.message_type,
                    "Unknown message type"
                );
                Envelope::error_reply(request.id.clone(), "unknown message type")
            }
        };

        if request.reply_to.is_empty() {
            warn!(
                correlation_id = %request.id,
                message_type = %request.message_type,
                "Request has no reply destination, discarding reply"
            );
            return false;
        }

        match self.publisher.publish_reply(&request.reply_to, reply).await {
            Ok(()) => true,
            Err(e) => {
                error!(correlation_id = %request.id, error = %e, "Failed to enqueue reply");
                false
            }
        }
    }
}
