//! Integration tests for the broker request/reply bridge.
//!
//! Each test runs two bridges over one in-memory broker: this service on
//! `julong_notification` and a stand-in user service on `julong_sso`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::watch;
use uuid::Uuid;

use notifyhub_core::AppError;
use notifyhub_core::config::{BrokerConfig, RpcConfig};
use notifyhub_core::error::ErrorKind;
use notifyhub_core::result::AppResult;
use notifyhub_core::traits::UserLookup;
use notifyhub_database::{MemoryNotificationStore, NotificationStore};
use notifyhub_entity::notification::NewNotification;
use notifyhub_messaging::envelope::{CountUnreadPayload, UserIdPayload};
use notifyhub_messaging::{
    Broker, BrokerRequest, Envelope, HandlerRegistry, MemoryBroker, MessageType, MessagingBridge,
    RequestHandler,
};
use notifyhub_realtime::Hub;
use notifyhub_service::{CountUnreadHandler, NotificationPresenter, NotificationService};

const SERVICE_QUEUE: &str = "julong_notification";
const SSO_QUEUE: &str = "julong_sso";

/// Stand-in SSO handler: knows one user.
struct Sso {
    known: Uuid,
}

#[async_trait]
impl RequestHandler for Sso {
    async fn handle(&self, request: &Envelope) -> AppResult<Map<String, Value>> {
        let payload: UserIdPayload = request.decode_data()?;
        if payload.user_id != self.known {
            return Err(AppError::not_found("user not found"));
        }
        let mut data = Map::new();
        data.insert("user_id".into(), json!(payload.user_id));
        data.insert("name".into(), json!("Siti Rahma"));
        data.insert("email".into(), json!("siti@example.com"));
        Ok(data)
    }
}

struct Harness {
    broker: Arc<dyn Broker>,
    shutdown: watch::Sender<bool>,
}

impl Harness {
    fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            broker: Arc::new(MemoryBroker::new()),
            shutdown,
        }
    }

    async fn bridge(
        &self,
        queue: &str,
        timeout_secs: u64,
        handlers: HandlerRegistry,
    ) -> MessagingBridge {
        let broker_config = BrokerConfig {
            provider: "memory".into(),
            queue: queue.into(),
            ..Default::default()
        };
        let rpc_config = RpcConfig {
            reply_timeout_seconds: timeout_secs,
            user_service_queue: SSO_QUEUE.into(),
        };
        let mut bridge =
            MessagingBridge::new(&broker_config, &rpc_config, Arc::clone(&self.broker));
        bridge
            .start(handlers, self.shutdown.subscribe())
            .await
            .expect("bridge failed to start");
        bridge
    }

    async fn sso(&self, known: Uuid) -> MessagingBridge {
        let sso = Arc::new(Sso { known });
        let handlers = HandlerRegistry::new()
            .with(MessageType::FindUserById, sso.clone())
            .with(MessageType::GetUserMe, sso);
        self.bridge(SSO_QUEUE, 5, handlers).await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[tokio::test]
async fn test_user_lookup_round_trip() {
    let harness = Harness::new();
    let known = Uuid::new_v4();
    let _sso = harness.sso(known).await;
    let service = harness.bridge(SERVICE_QUEUE, 5, HandlerRegistry::new()).await;

    let users = service.user_directory();
    let summary = users.find_user_by_id(known).await.unwrap();
    assert_eq!(summary.user_id, known);
    assert_eq!(summary.name, "Siti Rahma");

    let me = users.get_user_me(known).await.unwrap();
    assert_eq!(me.get("email"), Some(&json!("siti@example.com")));

    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_error_reply_surfaces_as_external_service_error() {
    let harness = Harness::new();
    let _sso = harness.sso(Uuid::new_v4()).await;
    let service = harness.bridge(SERVICE_QUEUE, 5, HandlerRegistry::new()).await;

    let err = service
        .user_directory()
        .find_user_by_id(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.message.contains("user not found"), "{}", err.message);
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_unanswered_request_times_out_and_cleans_up() {
    let harness = Harness::new();
    let service = harness.bridge(SERVICE_QUEUE, 1, HandlerRegistry::new()).await;

    let err = service
        .user_directory()
        .find_user_by_id(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.message, "request timeout");
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_concurrent_lookups_get_their_own_replies() {
    let harness = Harness::new();
    let known = Uuid::new_v4();
    let _sso = harness.sso(known).await;
    let service = harness.bridge(SERVICE_QUEUE, 5, HandlerRegistry::new()).await;
    let users = service.user_directory();

    let lookups = (0..8).map(|i| {
        let users = users.clone();
        let id = if i % 2 == 0 { known } else { Uuid::new_v4() };
        async move { (id, users.find_user_by_id(id).await) }
    });
    for (id, result) in futures::future::join_all(lookups).await {
        if id == known {
            assert_eq!(result.unwrap().user_id, known);
        } else {
            assert_eq!(result.unwrap_err().kind, ErrorKind::ExternalService);
        }
    }
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn test_peer_counts_unread_through_broker() {
    let harness = Harness::new();
    let user = Uuid::new_v4();

    let store = Arc::new(MemoryNotificationStore::new());
    for application in ["MANPOWER", "MANPOWER", "ONBOARDING"] {
        store
            .create(NewNotification {
                application: application.into(),
                name: "Reminder".into(),
                url: "https://hr.example.com/r".into(),
                message: "Please review".into(),
                user_id: user,
                created_by: user,
            })
            .await
            .unwrap();
    }

    let (hub, hub_handle) = Hub::new();
    tokio::spawn(hub.run(harness.shutdown.subscribe()));
    let sso = harness.sso(user).await;
    let lookup: Arc<dyn UserLookup> = Arc::new(sso.user_directory());
    let notifications =
        NotificationService::new(store, NotificationPresenter::new(lookup), hub_handle);
    let handlers = HandlerRegistry::new().with(
        MessageType::CountUnreadNotifications,
        Arc::new(CountUnreadHandler::new(notifications)),
    );
    let _service = harness.bridge(SERVICE_QUEUE, 5, handlers).await;

    // Another service asking over the broker.
    let peer = harness.bridge("julong_recruitment", 5, HandlerRegistry::new()).await;
    let ask = |application: &str| {
        BrokerRequest::CountUnreadNotifications(CountUnreadPayload {
            user_id: user,
            application: application.to_string(),
        })
    };

    let reply = peer.rpc().send(SERVICE_QUEUE, ask("MANPOWER")).await.unwrap();
    assert_eq!(reply.message_data.get("count"), Some(&json!(2)));

    let reply = peer.rpc().send(SERVICE_QUEUE, ask("")).await.unwrap();
    assert_eq!(reply.message_data.get("count"), Some(&json!(3)));
}

#[tokio::test]
async fn test_unknown_request_type_gets_error_reply() {
    let harness = Harness::new();
    let _service = harness.bridge(SERVICE_QUEUE, 5, HandlerRegistry::new()).await;
    let peer = harness.bridge("julong_recruitment", 5, HandlerRegistry::new()).await;

    let reply = peer
        .rpc()
        .send(
            SERVICE_QUEUE,
            BrokerRequest::GetUserMe(UserIdPayload {
                user_id: Uuid::new_v4(),
            }),
        )
        .await
        .unwrap();
    assert_eq!(reply.error_message().as_deref(), Some("unknown message type"));
}
