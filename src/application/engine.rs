//! Single entry point bundling every administrative workflow over one store.

use std::sync::Arc;

use super::context::WorkflowSettings;
use super::directory::AccountDirectory;
use super::ledger::LedgerService;
use super::registration::RegistrationService;
use crate::domain::{AuditEntry, CredentialNotifier, DomainResult, MerchantStore};
use crate::shared::{Clock, SystemClock};

pub struct MerchantAdmin {
    pub registration: RegistrationService,
    pub directory: AccountDirectory,
    pub ledger: LedgerService,
    store: Arc<dyn MerchantStore>,
    settings: WorkflowSettings,
}

impl MerchantAdmin {
    pub fn new(
        store: Arc<dyn MerchantStore>,
        notifier: Arc<dyn CredentialNotifier>,
        settings: WorkflowSettings,
    ) -> Self {
        Self::with_clock(store, notifier, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        store: Arc<dyn MerchantStore>,
        notifier: Arc<dyn CredentialNotifier>,
        clock: Arc<dyn Clock>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            registration: RegistrationService::new(store.clone(), notifier, settings.clone()),
            directory: AccountDirectory::new(store.clone(), &settings),
            ledger: LedgerService::new(store.clone(), clock, &settings),
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Audit trail, optionally narrowed to one account. Oldest first.
    pub async fn audit_trail(&self, account_id: Option<i32>) -> DomainResult<Vec<AuditEntry>> {
        super::context::bounded(
            "list_audit_entries",
            self.settings.upstream_timeout,
            self.store.list_audit_entries(account_id),
        )
        .await
    }
}
