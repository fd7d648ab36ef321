//! In-process broker for tests and single-node deployments.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use notifyhub_core::result::AppResult;

use super::{Broker, Delivery};

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Vec<u8>>,
    notify: Arc<Notify>,
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, QueueState>,
    unacked: HashMap<u64, Delivery>,
}

/// Broker backed by in-memory queues.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    state: Mutex<State>,
    next_tag: AtomicU64,
    closed: AtomicBool,
    closed_notify: Notify,
}

impl MemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages ready on a queue.
    pub async fn ready_len(&self, queue: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(queue).map(|q| q.ready.len()).unwrap_or(0)
    }

    /// Number of deliveries handed out but not yet acked or nacked.
    pub async fn unacked_len(&self) -> usize {
        self.state.lock().await.unacked.len()
    }

    /// Wake every waiting consumer and make further waits return `None`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.closed_notify.notify_waiters();
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn declare_queue(&self, queue: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.queues.entry(queue.to_string()).or_default();
        Ok(())
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let q = state.queues.entry(queue.to_string()).or_default();
        q.ready.push_back(body.to_vec());
        q.notify.notify_one();
        debug!(queue = %queue, bytes = body.len(), "Message published");
        Ok(())
    }

    async fn next_delivery(&self, queue: &str) -> AppResult<Option<Delivery>> {
        loop {
            let closed = self.closed_notify.notified();
            if self.closed.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let notify = {
                let mut state = self.state.lock().await;
                let q = state.queues.entry(queue.to_string()).or_default();
                if let Some(body) = q.ready.pop_front() {
                    let delivery = Delivery {
                        queue: queue.to_string(),
                        tag: self.next_tag.fetch_add(1, Ordering::SeqCst) + 1,
                        body,
                    };
                    state.unacked.insert(delivery.tag, delivery.clone());
                    return Ok(Some(delivery));
                }
                Arc::clone(&q.notify)
            };

            tokio::select! {
                _ = notify.notified() => {}
                _ = closed => {}
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> AppResult<()> {
        self.state.lock().await.unacked.remove(&delivery.tag);
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.unacked.remove(&delivery.tag).is_some() && requeue {
            let q = state.queues.entry(delivery.queue.clone()).or_default();
            q.ready.push_front(delivery.body.clone());
            q.notify.notify_one();
        }
        Ok(())
    }
}
