//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tower::ServiceExt;
use uuid::Uuid;

use notifyhub_api::AppState;
use notifyhub_core::AppError;
use notifyhub_core::config::AppConfig;
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::UserLookup;
use notifyhub_core::types::UserSummary;
use notifyhub_database::MemoryNotificationStore;
use notifyhub_realtime::{Hub, HubHandle};
use notifyhub_service::{NotificationPresenter, NotificationService};

/// User directory answering from a fixed map.
#[derive(Debug, Default)]
pub struct FixedUsers(pub HashMap<Uuid, String>);

#[async_trait]
impl UserLookup for FixedUsers {
    async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<UserSummary> {
        self.0
            .get(&user_id)
            .map(|name| UserSummary {
                user_id,
                name: name.clone(),
            })
            .ok_or_else(|| AppError::external_service("[find_user_by_id] user not found"))
    }

    async fn get_user_me(&self, user_id: Uuid) -> AppResult<Map<String, Value>> {
        let summary = self.find_user_by_id(user_id).await?;
        let mut map = Map::new();
        map.insert("id".into(), Value::String(user_id.to_string()));
        map.insert("name".into(), Value::String(summary.name));
        Ok(map)
    }
}

/// Test application context backed by the in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Live client registry
    pub hub: HubHandle,
    /// Store shared with the service
    pub store: Arc<MemoryNotificationStore>,
    shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a new test application with no known users.
    pub async fn new() -> Self {
        Self::with_users(HashMap::new()).await
    }

    /// Create a new test application whose user directory knows `users`.
    pub async fn with_users(users: HashMap<Uuid, String>) -> Self {
        let config = Arc::new(AppConfig::default());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let (hub, hub_handle) = Hub::new();
        tokio::spawn(hub.run(shutdown_rx));

        let store = Arc::new(MemoryNotificationStore::new());
        let service = NotificationService::new(
            store.clone(),
            NotificationPresenter::new(Arc::new(FixedUsers(users))),
            hub_handle.clone(),
        );

        let state = AppState::new(config, service, hub_handle.clone());
        Self {
            router: notifyhub_api::build_router(state),
            hub: hub_handle,
            store,
            shutdown,
        }
    }

    /// Serve the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });
        addr
    }

    /// Poll the hub until it reports `expected` clients.
    pub async fn wait_for_clients(&self, expected: usize) {
        for _ in 0..100 {
            if self.hub.client_count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("hub never reached {expected} clients");
    }

    /// Stop the hub. Every client queue closes, the HTTP server keeps running.
    pub fn stop_hub(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Make a JSON request against the router.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Body for a create request.
pub fn create_body(application: &str, user_ids: &[Uuid], created_by: Uuid) -> Value {
    serde_json::json!({
        "application": application,
        "name": "Offer letter",
        "url": "https://hr.example.com/offers/42",
        "message": "Your offer letter is ready",
        "user_ids": user_ids,
        "created_by": created_by,
    })
}
