//! Prepaid balance workflow: top-ups and their reversal inside the void
//! window. Balance arithmetic and the final void re-check belong to the store.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::audit::{AuditRecorder, Audited};
use super::context::{bounded, AdminContext, WorkflowSettings};
use crate::domain::{
    AuditAction, DomainError, DomainResult, LedgerRow, MerchantStore, TopupLogEntry,
    TopupReceipt, VoidReceipt,
};
use crate::shared::Clock;

impl Audited for TopupReceipt {
    fn audit_subject(&self) -> Option<i32> {
        Some(self.cpo_account_id)
    }

    fn audit_remark(&self) -> String {
        self.reference_number.clone()
    }
}

impl Audited for VoidReceipt {
    fn audit_subject(&self) -> Option<i32> {
        Some(self.cpo_account_id)
    }

    fn audit_remark(&self) -> String {
        self.reference_number.clone()
    }
}

/// Pull the payload out of a successful ledger row. `account_id` is the
/// account the call addressed, if known up front.
fn settled(row: LedgerRow, account_id: Option<i32>) -> DomainResult<(String, i32, i64, String)> {
    if row.status != crate::domain::status::SUCCESS {
        return Err(DomainError::from_store_status(row.status, account_id));
    }
    match (row.account_id, row.current_balance, row.reference_number) {
        (Some(account_id), Some(balance), Some(reference_number)) => {
            Ok((row.status, account_id, balance, reference_number))
        }
        _ => Err(DomainError::UpstreamUnavailable(
            "ledger row is missing its payload".into(),
        )),
    }
}

pub struct LedgerService {
    store: Arc<dyn MerchantStore>,
    audit: AuditRecorder,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl LedgerService {
    pub fn new(store: Arc<dyn MerchantStore>, clock: Arc<dyn Clock>, settings: &WorkflowSettings) -> Self {
        Self {
            audit: AuditRecorder::new(store.clone(), settings.upstream_timeout),
            store,
            clock,
            timeout: settings.upstream_timeout,
        }
    }

    /// Credit `amount` minor units to an active account.
    pub async fn topup(
        &self,
        ctx: &AdminContext,
        account_id: i32,
        amount: i64,
    ) -> DomainResult<TopupReceipt> {
        self.audit
            .scoped(ctx, AuditAction::Topup, Some(account_id), async {
                if amount <= 0 {
                    return Err(DomainError::InvalidAmount(amount));
                }

                let row = bounded("topup", self.timeout, self.store.topup(account_id, amount)).await?;
                let (status, cpo_account_id, new_balance, reference_number) =
                    settled(row, Some(account_id))?;

                info!(account_id, amount, new_balance, reference_number = %reference_number, "CPO topped up");
                Ok(TopupReceipt {
                    status,
                    cpo_account_id,
                    new_balance,
                    reference_number,
                })
            })
            .await
    }

    /// Top-ups of `account_id` that can still be voided, oldest first.
    pub async fn voidable_topups(&self, account_id: i32) -> DomainResult<Vec<TopupLogEntry>> {
        let entries = bounded(
            "list_topups_awaiting_void",
            self.timeout,
            self.store.list_topups_awaiting_void(account_id),
        )
        .await?;

        let now = self.clock.now();
        Ok(entries
            .into_iter()
            .filter(|e| e.is_voidable_at(now))
            .collect())
    }

    /// Reverse the top-up with id `reference_id`.
    pub async fn void_topup(
        &self,
        ctx: &AdminContext,
        reference_id: i32,
    ) -> DomainResult<VoidReceipt> {
        self.audit
            .scoped(ctx, AuditAction::VoidTopup, None, async {
                let row = bounded("void_topup", self.timeout, self.store.void_topup(reference_id)).await?;
                let (status, cpo_account_id, current_balance, reference_number) =
                    settled(row, None)?;

                info!(
                    reference_id,
                    account_id = cpo_account_id,
                    current_balance,
                    reference_number = %reference_number,
                    "Top-up voided"
                );
                Ok(VoidReceipt {
                    status,
                    cpo_account_id,
                    current_balance,
                    reference_number,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedStore;
    use crate::domain::{AccountStatus, AuditOutcome};
    use crate::infrastructure::storage::InMemoryMerchantStore;
    use crate::shared::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn settings() -> WorkflowSettings {
        WorkflowSettings {
            upstream_timeout: Duration::from_millis(500),
            ..WorkflowSettings::default()
        }
    }

    fn ctx() -> AdminContext {
        AdminContext::new("admin-1")
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()))
    }

    async fn ledger_with_account() -> (Arc<ScriptedStore>, LedgerService, Arc<ManualClock>, i32) {
        let clock = clock();
        let store = Arc::new(ScriptedStore::with_clock(clock.clone()));
        let id = store.seed_account("GreenCharge", "GRE", 1).await;
        let ledger = LedgerService::new(store.clone(), clock.clone(), &settings());
        (store, ledger, clock, id)
    }

    #[tokio::test]
    async fn topup_credits_the_balance_and_audits_once() {
        let store = Arc::new(ScriptedStore::wrapping(
            InMemoryMerchantStore::new().starting_account_id(42),
        ));
        let id = store.seed_account("GreenCharge", "GRE", 1).await;
        assert_eq!(id, 42);
        store.inner().topup(42, 500).await.unwrap();

        let ledger = LedgerService::new(store.clone(), Arc::new(crate::shared::SystemClock), &settings());
        let receipt = ledger.topup(&ctx(), 42, 100).await.unwrap();
        assert_eq!(receipt.status, "SUCCESS");
        assert_eq!(receipt.new_balance, 600);
        assert!(receipt.reference_number.starts_with("TOP-"));

        let trail = store.audit_trail().await;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, "TOPUP");
        assert_eq!(trail[0].outcome, AuditOutcome::Success);
        assert_eq!(trail[0].subject_id, Some(42));
    }

    #[tokio::test]
    async fn non_positive_amounts_never_reach_the_store() {
        let (store, ledger, _, id) = ledger_with_account().await;

        for amount in [0, -5] {
            let err = ledger.topup(&ctx(), id, amount).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidAmount(a) if a == amount));
        }
        assert_eq!(store.calls("topup"), 0);

        let trail = store.audit_trail().await;
        assert_eq!(trail.len(), 2);
        assert!(trail
            .iter()
            .all(|e| e.outcome == AuditOutcome::Failed && e.remark == "INVALID_AMOUNT"));
    }

    #[tokio::test]
    async fn topup_of_inactive_or_missing_account_is_rejected() {
        let (store, ledger, _, id) = ledger_with_account().await;
        store
            .inner()
            .set_account_status(id, AccountStatus::Inactive)
            .await
            .unwrap();

        let err = ledger.topup(&ctx(), id, 100).await.unwrap_err();
        assert!(matches!(err, DomainError::Rejected(ref s) if s == "CPO_ACCOUNT_INACTIVE"));

        let err = ledger.topup(&ctx(), 77, 100).await.unwrap_err();
        assert_eq!(err.status_code(), "CPO_ACCOUNT_NOT_FOUND");
    }

    #[tokio::test]
    async fn voidable_list_follows_the_window() {
        let (_store, ledger, clock, id) = ledger_with_account().await;
        ledger.topup(&ctx(), id, 100).await.unwrap();

        assert_eq!(ledger.voidable_topups(id).await.unwrap().len(), 1);

        clock.advance(chrono::Duration::minutes(59) + chrono::Duration::seconds(59));
        assert_eq!(ledger.voidable_topups(id).await.unwrap().len(), 1);

        clock.advance(chrono::Duration::seconds(1));
        assert!(ledger.voidable_topups(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn voidable_list_is_guarded_by_the_workflow_clock() {
        let store_clock = clock();
        let store = Arc::new(ScriptedStore::with_clock(store_clock.clone()));
        let id = store.seed_account("GreenCharge", "GRE", 1).await;
        store.inner().topup(id, 100).await.unwrap();

        let late = clock();
        late.advance(chrono::Duration::minutes(61));
        let ledger = LedgerService::new(store.clone(), late, &settings());

        assert_eq!(store.inner().list_topups_awaiting_void(id).await.unwrap().len(), 1);
        assert!(ledger.voidable_topups(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn void_reverses_a_topup() {
        let (store, ledger, _, id) = ledger_with_account().await;
        ledger.topup(&ctx(), id, 250).await.unwrap();
        let pending = ledger.voidable_topups(id).await.unwrap();

        let receipt = ledger.void_topup(&ctx(), pending[0].id).await.unwrap();
        assert_eq!(receipt.current_balance, 0);
        assert!(receipt.reference_number.starts_with("VOD-"));
        assert!(ledger.voidable_topups(id).await.unwrap().is_empty());

        let trail = store.audit_trail().await;
        assert_eq!(trail.last().unwrap().action, "VOID_TOPUP");
        assert_eq!(trail.last().unwrap().subject_id, Some(id));
    }

    #[tokio::test]
    async fn void_after_the_window_is_rejected() {
        let (_store, ledger, clock, id) = ledger_with_account().await;
        ledger.topup(&ctx(), id, 100).await.unwrap();
        let pending = ledger.voidable_topups(id).await.unwrap();

        clock.advance(chrono::Duration::minutes(60));
        let err = ledger.void_topup(&ctx(), pending[0].id).await.unwrap_err();
        assert!(matches!(err, DomainError::Rejected(ref s) if s == "VOID_WINDOW_EXPIRED"));
    }

    #[tokio::test]
    async fn concurrent_voids_settle_exactly_once() {
        let (store, ledger, _, id) = ledger_with_account().await;
        ledger.topup(&ctx(), id, 100).await.unwrap();
        let reference_id = ledger.voidable_topups(id).await.unwrap()[0].id;

        let (first, second) = (ctx(), ctx());
        let (a, b) = tokio::join!(
            ledger.void_topup(&first, reference_id),
            ledger.void_topup(&second, reference_id)
        );
        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(DomainError::Rejected(s)) if s == "TOPUP_ALREADY_VOIDED"
        )));

        let voids: Vec<_> = store
            .audit_trail()
            .await
            .into_iter()
            .filter(|e| e.action == "VOID_TOPUP")
            .collect();
        assert_eq!(voids.len(), 2);
        assert_eq!(
            store.inner().get_account(id).await.unwrap().unwrap().balance,
            0
        );
    }

    #[tokio::test]
    async fn unknown_reference_is_rejected() {
        let (_store, ledger, _, _) = ledger_with_account().await;
        let err = ledger.void_topup(&ctx(), 12345).await.unwrap_err();
        assert!(matches!(err, DomainError::Rejected(ref s) if s == "TOPUP_NOT_FOUND"));
    }
}
