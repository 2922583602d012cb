//! CPO onboarding workflow
//!
//! Validates the company profile, allocates a party identifier, generates
//! login credentials, persists the account and delivers the credentials to
//! the company contact. Every invocation leaves exactly one audit entry.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::allocator::IdentifierAllocator;
use super::audit::{AuditRecorder, Audited};
use super::context::{bounded, AdminContext, NotificationPolicy, WorkflowSettings};
use crate::domain::{
    status, AuditAction, AvailabilityField, CompanyProfile, CredentialNotifier, Credentials,
    DeliveryReceipt, DomainError, DomainResult, MerchantStore, PartyId,
};
use crate::infrastructure::crypto::password::generate_password;
use crate::shared::{retry_with_backoff, RetryConfig};

/// Outcome of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub status: String,
    pub account_id: i32,
    pub party_id: PartyId,
    pub username: String,
    /// False when best-effort delivery of the login credentials failed.
    pub credentials_delivered: bool,
}

impl Audited for Registration {
    fn audit_subject(&self) -> Option<i32> {
        Some(self.account_id)
    }
}

pub struct RegistrationService {
    store: Arc<dyn MerchantStore>,
    notifier: Arc<dyn CredentialNotifier>,
    allocator: IdentifierAllocator,
    audit: AuditRecorder,
    settings: WorkflowSettings,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn MerchantStore>,
        notifier: Arc<dyn CredentialNotifier>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            allocator: IdentifierAllocator::new(store.clone(), settings.upstream_timeout),
            audit: AuditRecorder::new(store.clone(), settings.upstream_timeout),
            store,
            notifier,
            settings,
        }
    }

    pub async fn register(
        &self,
        ctx: &AdminContext,
        profile: &CompanyProfile,
    ) -> DomainResult<Registration> {
        self.audit
            .scoped(ctx, AuditAction::RegisterCpo, None, self.run(profile))
            .await
    }

    /// Read-only uniqueness check for one registration field.
    pub async fn check_availability(&self, field: &str, value: &str) -> DomainResult<()> {
        let field: AvailabilityField = field.trim().parse()?;
        let value = value.trim();
        field.check_format(value)?;

        let row = bounded(
            "check_availability",
            self.settings.upstream_timeout,
            self.store.check_availability(field, value),
        )
        .await?;

        if row.is_success() {
            Ok(())
        } else {
            Err(DomainError::from_store_status(row.status, None))
        }
    }

    async fn run(&self, profile: &CompanyProfile) -> DomainResult<Registration> {
        let profile = profile.normalized()?;
        let credentials = Credentials {
            username: profile.username.clone(),
            password: generate_password(self.settings.password_length),
        };

        if self.settings.notification_policy == NotificationPolicy::Blocking {
            self.deliver(&profile.contact_email, &credentials).await?;
        }

        let (account_id, party_id) = retry_with_backoff(
            RetryConfig::with_max_attempts(self.settings.identifier_retry_attempts),
            || self.persist_once(&profile, &credentials.password),
            DomainError::is_retryable,
            "register_cpo",
        )
        .await?;

        let credentials_delivered = match self.settings.notification_policy {
            NotificationPolicy::Blocking => true,
            NotificationPolicy::BestEffort => {
                match self.deliver(&profile.contact_email, &credentials).await {
                    Ok(_) => true,
                    Err(e) => {
                        error!(
                            account_id,
                            username = %credentials.username,
                            error = %e,
                            "Credential delivery failed; account stays registered"
                        );
                        false
                    }
                }
            }
        };

        info!(
            account_id,
            party_id = %party_id,
            username = %credentials.username,
            credentials_delivered,
            "CPO registered"
        );

        Ok(Registration {
            status: status::SUCCESS.to_string(),
            account_id,
            party_id,
            username: credentials.username,
            credentials_delivered,
        })
    }

    /// One allocate+persist attempt against a fresh identifier snapshot.
    async fn persist_once(
        &self,
        profile: &CompanyProfile,
        password: &str,
    ) -> DomainResult<(i32, PartyId)> {
        let party_id = self.allocator.allocate(&profile.cpo_owner_name).await?;

        let row = bounded(
            "allocate_and_persist_account",
            self.settings.upstream_timeout,
            self.store
                .allocate_and_persist_account(profile, &party_id, password),
        )
        .await?;

        match row.status.as_str() {
            status::SUCCESS => {
                let account_id = row.account_id.ok_or_else(|| {
                    DomainError::UpstreamUnavailable(
                        "registration succeeded without an account id".into(),
                    )
                })?;
                Ok((account_id, party_id))
            }
            status::DUPLICATE_PARTY_ID => {
                warn!(party_id = %party_id, "Party id taken concurrently");
                Err(DomainError::IdentifierConflict(party_id.into_inner()))
            }
            _ => Err(DomainError::from_store_status(row.status, None)),
        }
    }

    async fn deliver(&self, address: &str, credentials: &Credentials) -> DomainResult<DeliveryReceipt> {
        bounded(
            "notify_credentials",
            self.settings.upstream_timeout,
            self.notifier.notify(address, credentials),
        )
        .await
    }
}
