//! User identity as seen from this service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display fields of a user resolved from the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
}
