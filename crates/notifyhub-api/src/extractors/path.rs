//! Typed path and query parameter helpers.

use uuid::Uuid;

use notifyhub_core::error::AppError;

/// Parses a UUID from a path segment or query value.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}
