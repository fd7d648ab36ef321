//! Messages pushed to WebSocket clients.

pub mod event;

pub use event::NotificationEvent;
