//! Caller context and workflow settings shared by every workflow.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Identity of the administrator performing an action. Authentication and
/// role checks happen before a workflow is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    pub actor_id: String,
}

impl AdminContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
        }
    }
}

/// Whether a failed credential delivery aborts registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Persist first, then notify; a delivery failure is logged and reported
    /// in the result but the account stays registered.
    #[default]
    BestEffort,
    /// Notify before persisting; a delivery failure fails the registration.
    Blocking,
}

pub const MIN_PASSWORD_LENGTH: usize = 10;

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Upper bound for every store or notifier call.
    pub upstream_timeout: Duration,
    pub password_length: usize,
    pub notification_policy: NotificationPolicy,
    /// Attempts at allocate+persist when the store reports a party-id clash.
    pub identifier_retry_attempts: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(10),
            password_length: MIN_PASSWORD_LENGTH,
            notification_policy: NotificationPolicy::BestEffort,
            identifier_retry_attempts: 3,
        }
    }
}

/// Run an upstream call under `limit`; elapsing maps to `UpstreamTimeout`.
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::UpstreamTimeout(operation.to_string())),
    }
}
