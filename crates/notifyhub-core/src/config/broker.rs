//! Message broker and request/reply bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Message broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker provider: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Key prefix for every queue list.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// This service's own inbound queue.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Longest a single blocking pop on an empty queue waits, in milliseconds.
    #[serde(default = "default_block_timeout")]
    pub block_timeout_ms: u64,
    /// Capacity of each publisher ingress channel.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl BrokerConfig {
    pub fn block_timeout(&self) -> Duration {
        Duration::from_millis(self.block_timeout_ms)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: default_url(),
            key_prefix: default_key_prefix(),
            queue: default_queue(),
            block_timeout_ms: default_block_timeout(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Request/reply correlation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// How long a caller waits for a reply before giving up.
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_seconds: u64,
    /// Queue served by the user directory service.
    #[serde(default = "default_user_service_queue")]
    pub user_service_queue: String,
}

impl RpcConfig {
    /// Reply timeout as a [`Duration`].
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_seconds)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            reply_timeout_seconds: default_reply_timeout(),
            user_service_queue: default_user_service_queue(),
        }
    }
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "notifyhub:queue:".to_string()
}

fn default_queue() -> String {
    "julong_notification".to_string()
}

fn default_block_timeout() -> u64 {
    1000
}

fn default_outbound_buffer() -> usize {
    10
}

fn default_reply_timeout() -> u64 {
    100
}

fn default_user_service_queue() -> String {
    "julong_sso".to_string()
}
