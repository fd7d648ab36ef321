//! Shared application state passed to all handlers via Axum's `State` extractor.

use std::sync::Arc;

use notifyhub_core::config::AppConfig;
use notifyhub_realtime::HubHandle;
use notifyhub_service::NotificationService;

/// Central state container. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Notification lifecycle and presentation.
    pub notifications: NotificationService,
    /// Live client registry.
    pub hub: HubHandle,
}

impl AppState {
    /// Assemble the state from its parts.
    pub fn new(config: Arc<AppConfig>, notifications: NotificationService, hub: HubHandle) -> Self {
        Self {
            config,
            notifications,
            hub,
        }
    }
}
