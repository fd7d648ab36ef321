//! Message broker abstraction.
//!
//! A broker exposes durable named queues with explicit acknowledgement.
//! Publishing is fire-and-forget: a successful [`Broker::publish`] only
//! means the broker accepted the bytes.

pub mod memory;
pub mod redis;

use async_trait::async_trait;

use notifyhub_core::result::AppResult;

pub use self::memory::MemoryBroker;
pub use self::redis::RedisBroker;

/// A message taken from a queue that still awaits ack or nack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Queue the message was taken from.
    pub queue: String,
    /// Broker-assigned delivery tag.
    pub tag: u64,
    /// Raw message body.
    pub body: Vec<u8>,
}

/// Durable queue operations used by the publisher and consumer loops.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Make sure a queue exists.
    async fn declare_queue(&self, queue: &str) -> AppResult<()>;

    /// Append a message to a queue.
    async fn publish(&self, queue: &str, body: &[u8]) -> AppResult<()>;

    /// Wait for the next message on a queue.
    ///
    /// Returns `None` when the broker has been closed. Dropping the future
    /// before it resolves must not lose a message for good.
    async fn next_delivery(&self, queue: &str) -> AppResult<Option<Delivery>>;

    /// Positively acknowledge a delivery, removing it for good.
    async fn ack(&self, delivery: &Delivery) -> AppResult<()>;

    /// Negatively acknowledge a delivery, optionally putting it back at the
    /// head of its queue.
    async fn nack(&self, delivery: &Delivery, requeue: bool) -> AppResult<()>;
}
