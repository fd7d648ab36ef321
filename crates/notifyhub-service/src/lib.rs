//! # notifyhub-service
//!
//! Business logic service layer for NotifyHub. Services receive their
//! collaborators (store, user lookup, hub) at construction time via `Arc`
//! references and handles.

pub mod notification;

pub use notification::{
    CountUnreadHandler, CreateNotifications, NotificationPresenter, NotificationService,
    NotificationView,
};
