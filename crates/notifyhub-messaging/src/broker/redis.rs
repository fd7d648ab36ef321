//! Redis-backed broker using reliable list queues.
//!
//! Each queue is a list at `{prefix}{queue}`; producers `LPUSH`, the
//! consumer atomically moves the oldest entry into `{prefix}{queue}:processing`
//! with a blocking `BLMOVE`, on a connection of its own per queue so the
//! shared connection never sits behind a blocked pop. Ack removes it from the processing list, nack with requeue
//! moves it back to the head of the queue. Entries left in a processing list
//! by a crashed consumer are put back when the queue is declared again, so a
//! queue must have a single consuming process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use redis::Client;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::{debug, info, warn};

use notifyhub_core::config::BrokerConfig;
use notifyhub_core::error::{AppError, ErrorKind};
use notifyhub_core::result::AppResult;

use super::{Broker, Delivery};

/// Broker backed by Redis lists.
#[derive(Clone)]
pub struct RedisBroker {
    client: Client,
    /// Shared connection for everything except blocking pops.
    conn: ConnectionManager,
    /// One blocking-pop connection per consumed queue.
    consumers: Arc<DashMap<String, ConnectionManager>>,
    key_prefix: String,
    block_timeout: Duration,
    /// Local delivery tag counter.
    next_tag: Arc<AtomicU64>,
}

impl std::fmt::Debug for RedisBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBroker")
            .field("key_prefix", &self.key_prefix)
            .field("block_timeout", &self.block_timeout)
            .finish()
    }
}

impl RedisBroker {
    /// Connect to Redis using the broker configuration.
    pub async fn connect(config: &BrokerConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis broker");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client.clone()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis broker");
        Ok(Self {
            client,
            conn,
            consumers: Arc::new(DashMap::new()),
            key_prefix: config.key_prefix.clone(),
            block_timeout: config.block_timeout(),
            next_tag: Arc::new(AtomicU64::new(0)),
        })
    }

    fn queue_key(&self, queue: &str) -> String {
        format!("{}{queue}", self.key_prefix)
    }

    fn processing_key(&self, queue: &str) -> String {
        format!("{}{queue}:processing", self.key_prefix)
    }

    /// Connection dedicated to `BLMOVE` on `queue`. Its response timeout
    /// outlasts the block window.
    async fn consumer_conn(&self, queue: &str) -> AppResult<ConnectionManager> {
        if let Some(conn) = self.consumers.get(queue) {
            return Ok(conn.clone());
        }
        let config = ConnectionManagerConfig::new()
            .set_response_timeout(Some(self.block_timeout + Duration::from_secs(5)));
        let conn = ConnectionManager::new_with_config(self.client.clone(), config)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Broker, "Failed to open consumer connection", e)
            })?;
        Ok(self
            .consumers
            .entry(queue.to_string())
            .or_insert(conn)
            .clone())
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Broker, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn declare_queue(&self, queue: &str) -> AppResult<()> {
        let key = self.queue_key(queue);
        let processing = self.processing_key(queue);
        let mut conn = self.conn.clone();

        let mut recovered = 0usize;
        loop {
            let moved: Option<Vec<u8>> = redis::cmd("LMOVE")
                .arg(&processing)
                .arg(&key)
                .arg("LEFT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            warn!(queue = %queue, recovered, "Requeued unacknowledged messages");
        }
        info!(queue = %queue, "Queue declared");
        Ok(())
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("LPUSH")
            .arg(self.queue_key(queue))
            .arg(body)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        debug!(queue = %queue, bytes = body.len(), "Message published");
        Ok(())
    }

    async fn next_delivery(&self, queue: &str) -> AppResult<Option<Delivery>> {
        let key = self.queue_key(queue);
        let processing = self.processing_key(queue);
        let mut conn = self.consumer_conn(queue).await?;

        loop {
            let body: Option<Vec<u8>> = redis::cmd("BLMOVE")
                .arg(&key)
                .arg(&processing)
                .arg("RIGHT")
                .arg("LEFT")
                .arg(self.block_timeout.as_secs_f64())
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;

            if let Some(body) = body {
                return Ok(Some(Delivery {
                    queue: queue.to_string(),
                    tag: self.next_tag.fetch_add(1, Ordering::Relaxed) + 1,
                    body,
                }));
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("LREM")
            .arg(self.processing_key(&delivery.queue))
            .arg(1)
            .arg(&delivery.body)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let processing = self.processing_key(&delivery.queue);

        if !requeue {
            let _: i64 = redis::cmd("LREM")
                .arg(&processing)
                .arg(1)
                .arg(&delivery.body)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            return Ok(());
        }

        let _: () = redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(&processing)
            .arg(1)
            .arg(&delivery.body)
            .ignore()
            .cmd("RPUSH")
            .arg(self.queue_key(&delivery.queue))
            .arg(&delivery.body)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
