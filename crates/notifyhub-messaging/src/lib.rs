//! # notifyhub-messaging
//!
//! Request/reply over a message broker. Outgoing requests are correlated
//! with their replies through a [`CorrelationRegistry`]; a single
//! [`Publisher`] loop writes to the broker and a single [`Consumer`] loop
//! reads this service's own queue, routing replies back to waiting callers
//! and answering inbound requests through a [`HandlerRegistry`].

pub mod bridge;
pub mod broker;
pub mod consumer;
pub mod envelope;
pub mod handler;
pub mod publisher;
pub mod registry;
pub mod rpc;
pub mod user_directory;

pub use bridge::MessagingBridge;
pub use broker::{Broker, Delivery, MemoryBroker, RedisBroker};
pub use consumer::{Consumer, DeliveryOutcome};
pub use envelope::{BrokerRequest, Envelope, MessageType};
pub use handler::{HandlerRegistry, RequestHandler};
pub use publisher::{OutboundMessage, Publisher, PublisherHandle};
pub use registry::{CorrelationRegistry, DeliverOutcome};
pub use rpc::RpcClient;
pub use user_directory::UserDirectory;
