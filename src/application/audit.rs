//! Audit recorder: one trail entry per administrative action.
//!
//! [`AuditRecorder::scoped`] runs an operation to completion, writes exactly
//! one entry describing its final outcome, then hands back the operation's
//! result untouched. Writing the entry is best-effort: a failed or slow audit
//! write is logged and counted but never replaces the operation's outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::context::{bounded, AdminContext};
use crate::domain::{
    status, AuditAction, AuditOutcome, DomainResult, MerchantStore, NewAuditEntry,
};

/// What a successful result contributes to its audit entry.
pub trait Audited {
    /// Account the action ended up touching, when only known afterwards.
    fn audit_subject(&self) -> Option<i32> {
        None
    }

    fn audit_remark(&self) -> String {
        status::SUCCESS.to_string()
    }
}

impl Audited for String {
    fn audit_remark(&self) -> String {
        self.clone()
    }
}

/// Record action outcome and latency.
fn record_action_metrics(action: AuditAction, outcome: AuditOutcome, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("cpo_admin_action_latency_seconds", "action" => action.as_str())
        .record(duration);
    metrics::counter!(
        "cpo_admin_actions_total",
        "action" => action.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub struct AuditRecorder {
    store: Arc<dyn MerchantStore>,
    timeout: Duration,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn MerchantStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Run `operation`, then append one audit entry for its outcome.
    ///
    /// `subject_id` is the account known up front; a successful result may
    /// supply it instead through [`Audited::audit_subject`].
    pub async fn scoped<T, Fut>(
        &self,
        ctx: &AdminContext,
        action: AuditAction,
        subject_id: Option<i32>,
        operation: Fut,
    ) -> DomainResult<T>
    where
        T: Audited,
        Fut: Future<Output = DomainResult<T>>,
    {
        let start = Instant::now();
        let result = operation.await;

        let entry = match &result {
            Ok(value) => {
                info!(
                    actor_id = %ctx.actor_id,
                    action = action.as_str(),
                    subject_id = ?value.audit_subject().or(subject_id),
                    "Administrative action succeeded"
                );
                NewAuditEntry {
                    actor_id: ctx.actor_id.clone(),
                    subject_id: value.audit_subject().or(subject_id),
                    action,
                    outcome: AuditOutcome::Success,
                    remark: value.audit_remark(),
                }
            }
            Err(err) => {
                warn!(
                    actor_id = %ctx.actor_id,
                    action = action.as_str(),
                    subject_id = ?subject_id,
                    error = %err,
                    "Administrative action failed"
                );
                NewAuditEntry {
                    actor_id: ctx.actor_id.clone(),
                    subject_id,
                    action,
                    outcome: AuditOutcome::Failed,
                    remark: err.status_code(),
                }
            }
        };

        let outcome = entry.outcome;
        self.append(entry).await;
        record_action_metrics(action, outcome, start);

        result
    }

    async fn append(&self, entry: NewAuditEntry) {
        let action = entry.action;
        let actor_id = entry.actor_id.clone();

        if let Err(e) = bounded(
            "record_audit_entry",
            self.timeout,
            self.store.record_audit_entry(entry),
        )
        .await
        {
            metrics::counter!("cpo_admin_audit_write_failures_total", "action" => action.as_str())
                .increment(1);
            error!(
                actor_id = %actor_id,
                action = action.as_str(),
                error = %e,
                "Failed to write audit entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedStore;
    use crate::domain::DomainError;

    fn recorder(store: &Arc<ScriptedStore>) -> AuditRecorder {
        AuditRecorder::new(store.clone(), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn success_writes_one_success_entry() {
        let store = Arc::new(ScriptedStore::new());
        let ctx = AdminContext::new("admin-1");

        let result = recorder(&store)
            .scoped(&ctx, AuditAction::AddRfid, Some(3), async {
                Ok("SUCCESS".to_string())
            })
            .await;

        assert_eq!(result.unwrap(), "SUCCESS");
        let trail = store.audit_trail().await;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].outcome, AuditOutcome::Success);
        assert_eq!(trail[0].actor_id, "admin-1");
        assert_eq!(trail[0].subject_id, Some(3));
        assert_eq!(trail[0].action, "ADD_RFID");
    }

    #[tokio::test]
    async fn failure_writes_one_failed_entry_and_keeps_the_error() {
        let store = Arc::new(ScriptedStore::new());
        let ctx = AdminContext::new("admin-1");

        let result: DomainResult<String> = recorder(&store)
            .scoped(&ctx, AuditAction::AddRfid, Some(3), async {
                Err(DomainError::Rejected("RFID_EXISTS".into()))
            })
            .await;

        assert!(matches!(result, Err(DomainError::Rejected(ref s)) if s == "RFID_EXISTS"));
        let trail = store.audit_trail().await;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].outcome, AuditOutcome::Failed);
        assert_eq!(trail[0].remark, "RFID_EXISTS");
    }

    #[tokio::test]
    async fn audit_write_failure_does_not_mask_the_original_error() {
        let store = Arc::new(ScriptedStore::new());
        store.fail_audit_writes();
        let ctx = AdminContext::new("admin-1");

        let result: DomainResult<String> = recorder(&store)
            .scoped(&ctx, AuditAction::Topup, Some(3), async {
                Err(DomainError::InvalidAmount(0))
            })
            .await;

        assert!(matches!(result, Err(DomainError::InvalidAmount(0))));
        assert!(store.audit_trail().await.is_empty());
    }

    #[tokio::test]
    async fn audit_write_failure_does_not_turn_success_into_error() {
        let store = Arc::new(ScriptedStore::new());
        store.fail_audit_writes();
        let ctx = AdminContext::new("admin-1");

        let result = recorder(&store)
            .scoped(&ctx, AuditAction::AddRfid, Some(3), async {
                Ok("SUCCESS".to_string())
            })
            .await;

        assert!(result.is_ok());
    }
}
