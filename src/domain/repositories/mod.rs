//! Merchant store port
//!
//! The store exposes one atomic operation per administrative action, the way
//! the platform's stored procedures do. Mutating operations answer with a
//! status code plus an optional payload row; the status set is open-ended and
//! owned by the store (see [`crate::domain::status`]).
//!
//! Balance arithmetic, the void re-check and party-id uniqueness are the
//! store's responsibility. Workflows only orchestrate and audit.

use async_trait::async_trait;

use super::account::{AccountChanges, AccountStatus, AvailabilityField, CompanyProfile, CpoAccount};
use super::audit::{AuditEntry, NewAuditEntry};
use super::ledger::TopupLogEntry;
use super::party_id::PartyId;
use super::status;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Bare status answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub status: String,
}

impl StatusRow {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn success() -> Self {
        Self::new(status::SUCCESS)
    }

    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }
}

/// Answer of the registration procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRow {
    pub status: String,
    pub account_id: Option<i32>,
}

impl RegistrationRow {
    pub fn success(account_id: i32) -> Self {
        Self {
            status: status::SUCCESS.to_string(),
            account_id: Some(account_id),
        }
    }

    pub fn rejected(code: impl Into<String>) -> Self {
        Self {
            status: code.into(),
            account_id: None,
        }
    }
}

/// Answer of the top-up and void procedures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub status: String,
    pub account_id: Option<i32>,
    pub current_balance: Option<i64>,
    pub reference_number: Option<String>,
}

impl LedgerRow {
    pub fn success(
        account_id: i32,
        current_balance: i64,
        reference_number: impl Into<String>,
    ) -> Self {
        Self {
            status: status::SUCCESS.to_string(),
            account_id: Some(account_id),
            current_balance: Some(current_balance),
            reference_number: Some(reference_number.into()),
        }
    }

    pub fn rejected(code: impl Into<String>) -> Self {
        Self {
            status: code.into(),
            account_id: None,
            current_balance: None,
            reference_number: None,
        }
    }
}

#[async_trait]
pub trait MerchantStore: Send + Sync {
    // ── Accounts ────────────────────────────────────────────────

    /// Persist a new account with its party id and plain password (the store
    /// hashes it). Fails with `DUPLICATE_PARTY_ID` when the id was taken.
    async fn allocate_and_persist_account(
        &self,
        profile: &CompanyProfile,
        party_id: &PartyId,
        password: &str,
    ) -> DomainResult<RegistrationRow>;

    async fn check_availability(
        &self,
        field: AvailabilityField,
        value: &str,
    ) -> DomainResult<StatusRow>;

    async fn list_accounts(&self, limit: u64, offset: u64) -> DomainResult<Vec<CpoAccount>>;

    /// Case-insensitive substring match on the company name.
    async fn search_accounts_by_name(&self, pattern: &str) -> DomainResult<Vec<CpoAccount>>;

    async fn get_account(&self, id: i32) -> DomainResult<Option<CpoAccount>>;

    /// Apply a change set; returns the number of affected rows.
    async fn update_account(&self, id: i32, changes: &AccountChanges) -> DomainResult<u64>;

    /// Returns the number of rows whose status actually changed.
    async fn set_account_status(&self, id: i32, status: AccountStatus) -> DomainResult<u64>;

    async fn add_rfid(&self, account_id: i32, rfid_card_tag: &str) -> DomainResult<StatusRow>;

    async fn list_allocated_party_ids(&self) -> DomainResult<Vec<PartyId>>;

    // ── Ledger ──────────────────────────────────────────────────

    async fn topup(&self, account_id: i32, amount: i64) -> DomainResult<LedgerRow>;

    /// Re-checks window and void state atomically with the reversal.
    async fn void_topup(&self, reference_id: i32) -> DomainResult<LedgerRow>;

    /// Top-ups still inside the void window and not voided, oldest first.
    async fn list_topups_awaiting_void(&self, account_id: i32) -> DomainResult<Vec<TopupLogEntry>>;

    // ── Audit ───────────────────────────────────────────────────

    async fn record_audit_entry(&self, entry: NewAuditEntry) -> DomainResult<()>;

    /// Oldest first. `None` lists every entry.
    async fn list_audit_entries(&self, subject_id: Option<i32>) -> DomainResult<Vec<AuditEntry>>;
}
