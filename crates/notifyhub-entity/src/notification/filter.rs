//! Query filters over notification records.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notifyhub_core::AppError;

/// Read-state selector used by list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadState {
    /// Only notifications with `read_at` set.
    Read,
    /// Only notifications with `read_at` unset.
    Unread,
}

impl FromStr for ReadState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Read),
            "NO" => Ok(Self::Unread),
            _ => Err(AppError::validation(format!(
                "Invalid read_at value: '{s}'. Expected YES or NO"
            ))),
        }
    }
}

/// Conjunction of optional criteria. An empty filter matches every live record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    /// Exact application match.
    pub application: Option<String>,
    /// Recipient user.
    pub user_id: Option<Uuid>,
    /// Read or unread only.
    pub read: Option<ReadState>,
}

impl NotificationFilter {
    /// Filter selecting every notification of one user.
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Whether a record satisfies every set criterion.
    pub fn matches(&self, notification: &super::Notification) -> bool {
        if let Some(app) = &self.application {
            if &notification.application != app {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if notification.user_id != user_id {
                return false;
            }
        }
        match self.read {
            Some(ReadState::Read) => notification.read_at.is_some(),
            Some(ReadState::Unread) => notification.read_at.is_none(),
            None => true,
        }
    }
}
