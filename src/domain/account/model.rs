//! CPO account domain entity

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle status of a CPO account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Charging Point Operator merchant account
#[derive(Debug, Clone, Serialize)]
pub struct CpoAccount {
    pub id: i32,
    /// Unique 3-character company code
    pub party_id: String,
    /// Company name
    pub cpo_owner_name: String,
    pub contact_name: String,
    pub contact_number: String,
    pub contact_email: String,
    pub username: String,
    /// Prepaid balance in minor units
    pub balance: i64,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl CpoAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Activation change requested by an administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Activate,
    Deactivate,
}

impl StatusAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "activate" => Some(Self::Activate),
            "deactivate" => Some(Self::Deactivate),
            _ => None,
        }
    }

    pub fn target_status(&self) -> AccountStatus {
        match self {
            Self::Activate => AccountStatus::Active,
            Self::Deactivate => AccountStatus::Inactive,
        }
    }
}
