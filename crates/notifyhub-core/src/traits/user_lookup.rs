//! Remote user directory lookups.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::user::UserSummary;

/// Resolves user identities owned by another service.
///
/// The production implementation performs request/reply calls over the
/// message broker; tests substitute a fixed in-process map.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    /// Look up a user's display summary.
    async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<UserSummary>;

    /// Fetch the full user profile object.
    async fn get_user_me(&self, user_id: Uuid) -> AppResult<Map<String, Value>>;
}
