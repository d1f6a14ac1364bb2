//! Account status
//!
//! Only active accounts pass authorization checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a user account.
///
/// # Examples
///
/// ```
/// use admin_users::UserStatus;
///
/// assert_eq!(UserStatus::parse("suspended"), Some(UserStatus::Suspended));
/// assert_eq!(UserStatus::Active.as_str(), "ACTIVE");
/// assert!(UserStatus::Active.is_active());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Account can sign in and pass guards.
    Active,

    /// Account disabled by its owner or an administrator.
    Inactive,

    /// Account blocked by an administrator.
    Suspended,
}

impl UserStatus {
    /// Check if this status allows access.
    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }

    /// Parse status from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
