//! Live delivery settings.

use serde::{Deserialize, Serialize};

/// Per-client limits of the WebSocket hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Capacity of each client's outbound queue. A client whose queue is
    /// full when an event arrives is evicted.
    pub client_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            client_buffer_size: 256,
        }
    }
}
