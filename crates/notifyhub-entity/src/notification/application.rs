//! Originating application of a notification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Application {
    /// Manpower planning.
    Manpower,
    /// Recruitment pipeline.
    Recruitment,
    /// Employee onboarding.
    Onboarding,
}

impl Application {
    /// All known applications.
    pub const ALL: [Application; 3] = [Self::Manpower, Self::Recruitment, Self::Onboarding];

    /// Return the application as its stored uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manpower => "MANPOWER",
            Self::Recruitment => "RECRUITMENT",
            Self::Onboarding => "ONBOARDING",
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Application {
    type Err = notifyhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANPOWER" => Ok(Self::Manpower),
            "RECRUITMENT" => Ok(Self::Recruitment),
            "ONBOARDING" => Ok(Self::Onboarding),
            _ => Err(notifyhub_core::AppError::validation(format!(
                "Invalid application: '{s}'. Expected one of: MANPOWER, RECRUITMENT, ONBOARDING"
            ))),
        }
    }
}
