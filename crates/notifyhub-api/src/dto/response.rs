//! Response bodies.

use serde::Serialize;

/// Envelope around every successful body: `{success, message, data}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Body of `GET /unread/count`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ws_clients: usize,
}
