//! Correlation of outstanding requests with their replies.

use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::oneshot;
use tracing::debug;

use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;

use crate::envelope::Envelope;

/// A caller waiting for the reply with a given id.
#[derive(Debug)]
struct PendingReply {
    reply_tx: oneshot::Sender<Envelope>,
    created_at: Instant,
}

/// Result of handing an inbound envelope to the registry.
#[derive(Debug)]
pub enum DeliverOutcome {
    /// A waiting caller received the envelope.
    Delivered,
    /// No caller is waiting for this id; the envelope is returned.
    NotPending(Envelope),
}

/// Map of correlation id to the single-use channel of the waiting caller.
///
/// Every entry leaves the map exactly once: through [`deliver`] when the
/// reply arrives, or through [`remove`] when the caller gives up.
///
/// [`deliver`]: CorrelationRegistry::deliver
/// [`remove`]: CorrelationRegistry::remove
#[derive(Debug, Default)]
pub struct CorrelationRegistry {
    pending: DashMap<String, PendingReply>,
}

impl CorrelationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller for `id` and return the receiving end of its reply channel.
    pub fn register(&self, id: &str) -> AppResult<oneshot::Receiver<Envelope>> {
        match self.pending.entry(id.to_string()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Correlation id '{id}' is already pending"
            ))),
            Entry::Vacant(slot) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                slot.insert(PendingReply {
                    reply_tx,
                    created_at: Instant::now(),
                });
                Ok(reply_rx)
            }
        }
    }

    /// Route an envelope to the caller waiting on its id. Never blocks.
    pub fn deliver(&self, envelope: Envelope) -> DeliverOutcome {
        let Some((_, pending)) = self.pending.remove(&envelope.id) else {
            return DeliverOutcome::NotPending(envelope);
        };

        debug!(
            correlation_id = %envelope.id,
            elapsed_ms = pending.created_at.elapsed().as_millis() as u64,
            "Reply matched pending request"
        );

        match pending.reply_tx.send(envelope) {
            Ok(()) => DeliverOutcome::Delivered,
            Err(envelope) => DeliverOutcome::NotPending(envelope),
        }
    }

    /// Drop the entry for `id`. Returns whether it was still pending.
    pub fn remove(&self, id: &str) -> bool {
        self.pending.remove(id).is_some()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Ids currently pending, in no particular order.
    #[cfg(test)]
    pub(crate) fn pending_ids(&self) -> Vec<String> {
        self.pending.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no request is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
