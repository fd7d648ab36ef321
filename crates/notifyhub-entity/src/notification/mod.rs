//! Notification domain entities.

pub mod application;
pub mod filter;
pub mod model;

pub use application::Application;
pub use filter::{NotificationFilter, ReadState};
pub use model::{NewNotification, Notification, NotificationChanges};
