//! # notifyhub-api
//!
//! HTTP API layer for NotifyHub built on Axum.
//!
//! Provides the notification REST endpoints, the WebSocket upgrade for live
//! delivery, middleware (CORS, request logging), DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
