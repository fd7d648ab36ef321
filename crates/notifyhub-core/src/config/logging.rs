//! Log output settings.

use serde::{Deserialize, Serialize};

/// Filter directive and output format for `tracing-subscriber`.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, e.g. `"info"` or `"notifyhub_messaging=debug"`.
    pub level: String,
    /// `"json"` for structured lines, anything else for human-readable output.
    pub format: String,
}

impl LoggingConfig {
    /// Whether structured JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "json".into(),
        }
    }
}
