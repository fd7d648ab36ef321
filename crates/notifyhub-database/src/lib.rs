//! # notifyhub-database
//!
//! PostgreSQL connection management, migrations, and the notification
//! stores (PostgreSQL-backed and in-memory).

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryNotificationStore;
pub use repositories::NotificationRepository;
pub use store::NotificationStore;
