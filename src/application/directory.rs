//! Account directory: listing, search and profile maintenance.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::audit::{AuditRecorder, Audited};
use super::context::{bounded, AdminContext, WorkflowSettings};
use crate::domain::{
    status, AccountChanges, AuditAction, CpoAccount, DomainError, DomainResult, MerchantStore,
    StatusAction,
};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Result of a profile or status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateOutcome {
    Applied,
    NoChangesApplied,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => status::SUCCESS,
            Self::NoChangesApplied => status::NO_CHANGES_APPLIED,
        }
    }
}

impl Audited for UpdateOutcome {
    fn audit_remark(&self) -> String {
        self.as_str().to_string()
    }
}

pub struct AccountDirectory {
    store: Arc<dyn MerchantStore>,
    audit: AuditRecorder,
    timeout: Duration,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn MerchantStore>, settings: &WorkflowSettings) -> Self {
        Self {
            audit: AuditRecorder::new(store.clone(), settings.upstream_timeout),
            store,
            timeout: settings.upstream_timeout,
        }
    }

    /// Page through accounts ordered by id. `limit` is clamped to 1..=100.
    pub async fn list(&self, limit: u64, offset: u64) -> DomainResult<Vec<CpoAccount>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        bounded("list_accounts", self.timeout, self.store.list_accounts(limit, offset)).await
    }

    /// Case-insensitive company-name search; a blank pattern lists the first
    /// page instead.
    pub async fn search(&self, pattern: &str) -> DomainResult<Vec<CpoAccount>> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return self.list(DEFAULT_PAGE_SIZE, 0).await;
        }
        bounded(
            "search_accounts_by_name",
            self.timeout,
            self.store.search_accounts_by_name(pattern),
        )
        .await
    }

    pub async fn get(&self, id: i32) -> DomainResult<CpoAccount> {
        bounded("get_account", self.timeout, self.store.get_account(id))
            .await?
            .ok_or_else(|| DomainError::account_not_found(id))
    }

    /// Apply profile changes given as raw `field -> value` pairs.
    pub async fn update(
        &self,
        ctx: &AdminContext,
        id: i32,
        raw: &BTreeMap<String, String>,
    ) -> DomainResult<UpdateOutcome> {
        self.audit
            .scoped(ctx, AuditAction::UpdateCpo, Some(id), async {
                let changes = AccountChanges::from_request(raw)?;
                if changes.is_empty() {
                    debug!(account_id = id, "Empty change set, nothing to write");
                    return Ok(UpdateOutcome::NoChangesApplied);
                }

                let affected = bounded(
                    "update_account",
                    self.timeout,
                    self.store.update_account(id, &changes),
                )
                .await?;
                if affected == 0 {
                    return Err(DomainError::account_not_found(id));
                }

                info!(account_id = id, fields = %changes.field_names(), "CPO details updated");
                Ok(UpdateOutcome::Applied)
            })
            .await
    }

    pub async fn add_rfid(
        &self,
        ctx: &AdminContext,
        account_id: i32,
        rfid_card_tag: &str,
    ) -> DomainResult<String> {
        self.audit
            .scoped(ctx, AuditAction::AddRfid, Some(account_id), async {
                let tag = rfid_card_tag.trim();
                if tag.is_empty() {
                    return Err(DomainError::Validation(
                        "Missing required property: rfid_card_tag".into(),
                    ));
                }

                let row = bounded(
                    "add_rfid",
                    self.timeout,
                    self.store.add_rfid(account_id, tag),
                )
                .await?;
                if !row.is_success() {
                    return Err(DomainError::from_store_status(row.status, Some(account_id)));
                }

                info!(account_id, rfid_card_tag = tag, "RFID card issued");
                Ok(row.status)
            })
            .await
    }

    /// Activate or deactivate an account. `action` is `activate` or
    /// `deactivate`, case-insensitive.
    pub async fn set_status(
        &self,
        ctx: &AdminContext,
        account_id: i32,
        action: &str,
    ) -> DomainResult<UpdateOutcome> {
        let parsed = StatusAction::parse(action);
        let audit_action = match parsed {
            Some(StatusAction::Activate) => AuditAction::ActivateCpo,
            Some(StatusAction::Deactivate) => AuditAction::DeactivateCpo,
            None => AuditAction::SetCpoStatus,
        };

        self.audit
            .scoped(ctx, audit_action, Some(account_id), async {
                let target = parsed
                    .ok_or_else(|| DomainError::Validation("INVALID_ACTION".into()))?
                    .target_status();
                let affected = bounded(
                    "set_account_status",
                    self.timeout,
                    self.store.set_account_status(account_id, target),
                )
                .await?;
                if affected > 0 {
                    info!(account_id, status = %target, "CPO status changed");
                    return Ok(UpdateOutcome::Applied);
                }

                // Nothing changed: either already in that state or missing.
                self.get(account_id).await?;
                Ok(UpdateOutcome::NoChangesApplied)
            })
            .await
    }
}
