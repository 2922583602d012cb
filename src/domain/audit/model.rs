//! Audit trail entities

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::errors::DomainError;

/// Administrative actions that leave an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RegisterCpo,
    UpdateCpo,
    AddRfid,
    ActivateCpo,
    DeactivateCpo,
    /// Status change whose requested action was not recognised.
    SetCpoStatus,
    Topup,
    VoidTopup,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterCpo => "REGISTER_CPO",
            Self::UpdateCpo => "UPDATE_CPO",
            Self::AddRfid => "ADD_RFID",
            Self::ActivateCpo => "ACTIVATE_CPO",
            Self::DeactivateCpo => "DEACTIVATE_CPO",
            Self::SetCpoStatus => "SET_CPO_STATUS",
            Self::Topup => "TOPUP",
            Self::VoidTopup => "VOID_TOPUP",
        }
    }

    /// Human readable line stored in the trail.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RegisterCpo => "Register CPO account",
            Self::UpdateCpo => "Update CPO account details",
            Self::AddRfid => "Issue RFID card to CPO",
            Self::ActivateCpo => "Activate CPO account",
            Self::DeactivateCpo => "Deactivate CPO account",
            Self::SetCpoStatus => "Change CPO account status",
            Self::Topup => "Top up CPO balance",
            Self::VoidTopup => "Void CPO top-up",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Failed,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for AuditOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::InvalidField(format!("audit outcome '{}'", other))),
        }
    }
}

/// Audit record as handed to the store. The store stamps id and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub actor_id: String,
    pub subject_id: Option<i32>,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    pub remark: String,
}

/// Persisted, immutable audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i32,
    pub actor_id: String,
    pub subject_id: Option<i32>,
    /// Action code, e.g. `TOPUP`.
    pub action: String,
    pub description: String,
    pub outcome: AuditOutcome,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}
