//! Notification use cases.

pub mod handler;
pub mod presenter;
pub mod service;

pub use handler::CountUnreadHandler;
pub use presenter::{NotificationPresenter, NotificationView};
pub use service::{CreateNotifications, NotificationService};
