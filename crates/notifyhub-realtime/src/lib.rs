//! # notifyhub-realtime
//!
//! Live notification delivery over WebSocket. Provides:
//!
//! - A [`Hub`] control loop owning the set of connected clients
//! - Filtered fan-out with eviction of clients that fall behind
//! - Per-connection read and write pumps

pub mod client;
pub mod hub;
pub mod message;
pub mod session;

pub use client::{Client, ClientId};
pub use hub::{Hub, HubHandle};
pub use message::NotificationEvent;
