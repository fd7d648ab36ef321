//! Handlers for inbound broker requests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use notifyhub_core::result::AppResult;

use crate::envelope::{Envelope, MessageType};

/// Answers one inbound request type.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Compute the reply payload for a request.
    async fn handle(&self, request: &Envelope) -> AppResult<Map<String, Value>>;
}

/// Dispatch table from message type to handler.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageType, Arc<dyn RequestHandler>>,
}

impl HandlerRegistry {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same type.
    pub fn register(&mut self, message_type: MessageType, handler: Arc<dyn RequestHandler>) {
        self.handlers.insert(message_type, handler);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, message_type: MessageType, handler: Arc<dyn RequestHandler>) -> Self {
        self.register(message_type, handler);
        self
    }

    /// Look up the handler for a type.
    pub fn get(&self, message_type: &MessageType) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.get(message_type).cloned()
    }

    /// Registered types.
    pub fn message_types(&self) -> Vec<MessageType> {
        self.handlers.keys().cloned().collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("message_types", &self.message_types())
            .finish()
    }
}
