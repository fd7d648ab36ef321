//! # notifyhub-core
//!
//! Core crate for NotifyHub. Contains configuration schemas, the unified
//! error system, shared value types, and the traits other crates implement
//! at their seams.
//!
//! This crate has **no** internal dependencies on other NotifyHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
