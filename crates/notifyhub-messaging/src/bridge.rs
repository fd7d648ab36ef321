//! Wiring of the publisher and consumer loops around one broker.
//!
//! The bridge is built in two steps. [`MessagingBridge::new`] creates the
//! correlation registry and the outbound channel, so an [`RpcClient`] is
//! available to services before they exist as request handlers.
//! [`MessagingBridge::start`] then declares the queue and spawns both loops.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use notifyhub_core::config::{BrokerConfig, RpcConfig};
use notifyhub_core::error::AppError;
use notifyhub_core::result::AppResult;

use crate::broker::Broker;
use crate::consumer::Consumer;
use crate::handler::HandlerRegistry;
use crate::publisher::{Publisher, PublisherHandle};
use crate::registry::CorrelationRegistry;
use crate::rpc::RpcClient;
use crate::user_directory::UserDirectory;

/// Request/reply bridge for this service's queue.
pub struct MessagingBridge {
    broker: Arc<dyn Broker>,
    queue: String,
    registry: Arc<CorrelationRegistry>,
    publisher: Option<Publisher>,
    handle: PublisherHandle,
    rpc: RpcClient,
    user_service_queue: String,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for MessagingBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingBridge")
            .field("queue", &self.queue)
            .field("user_service_queue", &self.user_service_queue)
            .field("pending", &self.registry.len())
            .field("started", &self.publisher.is_none())
            .finish()
    }
}

impl MessagingBridge {
    /// Prepare a bridge. Nothing is sent or received until [`start`](Self::start).
    pub fn new(
        broker_config: &BrokerConfig,
        rpc_config: &RpcConfig,
        broker: Arc<dyn Broker>,
    ) -> Self {
        let registry = Arc::new(CorrelationRegistry::new());
        let (publisher, handle) = Publisher::new(Arc::clone(&broker), broker_config.outbound_buffer);
        let rpc = RpcClient::new(
            Arc::clone(&registry),
            handle.clone(),
            broker_config.queue.clone(),
            rpc_config.reply_timeout(),
        );

        Self {
            broker,
            queue: broker_config.queue.clone(),
            registry,
            publisher: Some(publisher),
            handle,
            rpc,
            user_service_queue: rpc_config.user_service_queue.clone(),
            tasks: Vec::new(),
        }
    }

    /// Declare the service queue and spawn the publisher and consumer loops.
    ///
    /// Both loops stop when `cancel` flips to `true`. Starting twice is an
    /// error.
    pub async fn start(
        &mut self,
        handlers: HandlerRegistry,
        cancel: watch::Receiver<bool>,
    ) -> AppResult<()> {
        let publisher = self
            .publisher
            .take()
            .ok_or_else(|| AppError::conflict("Messaging bridge already started"))?;

        self.broker.declare_queue(&self.queue).await?;

        let served = handlers.message_types();
        let consumer = Consumer::new(
            Arc::clone(&self.broker),
            self.queue.clone(),
            Arc::clone(&self.registry),
            handlers,
            self.handle.clone(),
        );

        self.tasks.push(tokio::spawn(publisher.run(cancel.clone())));
        self.tasks.push(tokio::spawn(consumer.run(cancel)));

        info!(
            queue = %self.queue,
            handlers = served.len(),
            "Messaging bridge started"
        );
        Ok(())
    }

    /// Client for issuing requests through this bridge.
    pub fn rpc(&self) -> RpcClient {
        self.rpc.clone()
    }

    /// User lookups against the configured user service queue.
    pub fn user_directory(&self) -> UserDirectory {
        UserDirectory::new(self.rpc.clone(), self.user_service_queue.clone())
    }

    /// Correlation registry shared by the client and the consumer.
    pub fn registry(&self) -> Arc<CorrelationRegistry> {
        Arc::clone(&self.registry)
    }

    /// Wait for both loops to finish.
    ///
    /// The loops only stop once shutdown is signalled, so call this after
    /// flipping the cancel channel.
    pub async fn join(self) {
        let Self { tasks, .. } = self;
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Messaging task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};

    use crate::broker::MemoryBroker;
    use crate::envelope::{BrokerRequest, Envelope, MessageType, UserIdPayload};
    use crate::handler::RequestHandler;

    struct Echo;

    #[async_trait]
    impl RequestHandler for Echo {
        async fn handle(&self, request: &Envelope) -> AppResult<Map<String, Value>> {
            Ok(request.message_data.clone())
        }
    }

    fn configs(queue: &str) -> (BrokerConfig, RpcConfig) {
        let broker = BrokerConfig {
            queue: queue.to_string(),
            ..Default::default()
        };
        let rpc = RpcConfig {
            reply_timeout_seconds: 5,
            ..Default::default()
        };
        (broker, rpc)
    }

    #[tokio::test]
    async fn test_two_bridges_round_trip() {
        let broker: Arc<dyn Broker> = Arc::new(MemoryBroker::new());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let (a_broker, a_rpc) = configs("svc_a");
        let mut a = MessagingBridge::new(&a_broker, &a_rpc, Arc::clone(&broker));
        a.start(HandlerRegistry::new(), cancel_rx.clone()).await.unwrap();

        let (b_broker, b_rpc) = configs("svc_b");
        let mut b = MessagingBridge::new(&b_broker, &b_rpc, Arc::clone(&broker));
        let handlers = HandlerRegistry::new().with(MessageType::FindUserById, Arc::new(Echo));
        b.start(handlers, cancel_rx).await.unwrap();

        let user_id = uuid::Uuid::new_v4();
        let reply = a
            .rpc()
            .send("svc_b", BrokerRequest::FindUserById(UserIdPayload { user_id }))
            .await
            .unwrap();
        assert!(reply.is_reply());
        assert_eq!(reply.message_data.get("user_id"), Some(&json!(user_id)));
        assert!(a.registry().is_empty());

        cancel_tx.send(true).unwrap();
        a.join().await;
        b.join().await;
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let broker: Arc<dyn Broker> = Arc::new(MemoryBroker::new());
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let (broker_config, rpc_config) = configs("svc");
        let mut bridge = MessagingBridge::new(&broker_config, &rpc_config, broker);
        bridge.start(HandlerRegistry::new(), cancel_rx.clone()).await.unwrap();
        let err = bridge.start(HandlerRegistry::new(), cancel_rx).await.unwrap_err();
        assert_eq!(err.kind, notifyhub_core::error::ErrorKind::Conflict);
    }
}
