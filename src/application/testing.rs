//! Test doubles for workflow tests: a scriptable store and notifiers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};

use crate::domain::{
    AccountChanges, AccountStatus, AuditEntry, AvailabilityField, CompanyProfile, CpoAccount,
    CredentialNotifier, Credentials, DeliveryReceipt, DomainError, DomainResult, LedgerRow,
    MerchantStore, NewAuditEntry, PartyId, RegistrationRow, StatusRow, TopupLogEntry,
};
use crate::infrastructure::storage::InMemoryMerchantStore;
use crate::shared::Clock;

/// Wraps the in-memory store with call counting, scripted status answers and
/// stalls.
pub struct ScriptedStore {
    inner: InMemoryMerchantStore,
    calls: DashMap<&'static str, usize>,
    stalled: DashSet<&'static str>,
    scripted: DashMap<&'static str, VecDeque<String>>,
    fail_audit: AtomicBool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::wrapping(InMemoryMerchantStore::new())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::wrapping(InMemoryMerchantStore::with_clock(clock))
    }

    pub fn wrapping(inner: InMemoryMerchantStore) -> Self {
        Self {
            inner,
            calls: DashMap::new(),
            stalled: DashSet::new(),
            scripted: DashMap::new(),
            fail_audit: AtomicBool::new(false),
        }
    }

    /// Answer the next call of `op` with `status` instead of delegating.
    pub fn script_status(&self, op: &'static str, status: &str) {
        self.scripted
            .entry(op)
            .or_default()
            .push_back(status.to_string());
    }

    /// Make every call of `op` hang.
    pub fn stall(&self, op: &'static str) {
        self.stalled.insert(op);
    }

    pub fn fail_audit_writes(&self) {
        self.fail_audit.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.get(op).map(|c| *c).unwrap_or(0)
    }

    pub async fn audit_trail(&self) -> Vec<AuditEntry> {
        self.inner.list_audit_entries(None).await.unwrap()
    }

    /// Register an account straight through the inner store.
    pub async fn seed_account(&self, name: &str, party_id: &str, n: u32) -> i32 {
        let profile = CompanyProfile {
            cpo_owner_name: name.to_string(),
            contact_name: "Ana Cruz".to_string(),
            contact_number: format!("09{:09}", n),
            contact_email: format!("ops{}@example.ph", n),
            username: format!("cpo_{}", n),
        };
        let row = self
            .inner
            .allocate_and_persist_account(&profile, &PartyId::parse(party_id).unwrap(), "seedpassword")
            .await
            .unwrap();
        row.account_id.unwrap()
    }

    pub fn inner(&self) -> &InMemoryMerchantStore {
        &self.inner
    }

    async fn enter(&self, op: &'static str) -> Option<String> {
        *self.calls.entry(op).or_insert(0) += 1;
        if self.stalled.contains(op) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.scripted.get_mut(op).and_then(|mut q| q.pop_front())
    }
}

#[async_trait]
impl MerchantStore for ScriptedStore {
    async fn allocate_and_persist_account(
        &self,
        profile: &CompanyProfile,
        party_id: &PartyId,
        password: &str,
    ) -> DomainResult<RegistrationRow> {
        if let Some(status) = self.enter("allocate_and_persist_account").await {
            return Ok(RegistrationRow::rejected(status));
        }
        self.inner
            .allocate_and_persist_account(profile, party_id, password)
            .await
    }

    async fn check_availability(
        &self,
        field: AvailabilityField,
        value: &str,
    ) -> DomainResult<StatusRow> {
        if let Some(status) = self.enter("check_availability").await {
            return Ok(StatusRow::new(status));
        }
        self.inner.check_availability(field, value).await
    }

    async fn list_accounts(&self, limit: u64, offset: u64) -> DomainResult<Vec<CpoAccount>> {
        self.enter("list_accounts").await;
        self.inner.list_accounts(limit, offset).await
    }

    async fn search_accounts_by_name(&self, pattern: &str) -> DomainResult<Vec<CpoAccount>> {
        self.enter("search_accounts_by_name").await;
        self.inner.search_accounts_by_name(pattern).await
    }

    async fn get_account(&self, id: i32) -> DomainResult<Option<CpoAccount>> {
        self.enter("get_account").await;
        self.inner.get_account(id).await
    }

    async fn update_account(&self, id: i32, changes: &AccountChanges) -> DomainResult<u64> {
        self.enter("update_account").await;
        self.inner.update_account(id, changes).await
    }

    async fn set_account_status(&self, id: i32, status: AccountStatus) -> DomainResult<u64> {
        self.enter("set_account_status").await;
        self.inner.set_account_status(id, status).await
    }

    async fn add_rfid(&self, account_id: i32, rfid_card_tag: &str) -> DomainResult<StatusRow> {
        if let Some(status) = self.enter("add_rfid").await {
            return Ok(StatusRow::new(status));
        }
        self.inner.add_rfid(account_id, rfid_card_tag).await
    }

    async fn list_allocated_party_ids(&self) -> DomainResult<Vec<PartyId>> {
        self.enter("list_allocated_party_ids").await;
        self.inner.list_allocated_party_ids().await
    }

    async fn topup(&self, account_id: i32, amount: i64) -> DomainResult<LedgerRow> {
        if let Some(status) = self.enter("topup").await {
            return Ok(LedgerRow::rejected(status));
        }
        self.inner.topup(account_id, amount).await
    }

    async fn void_topup(&self, reference_id: i32) -> DomainResult<LedgerRow> {
        if let Some(status) = self.enter("void_topup").await {
            return Ok(LedgerRow::rejected(status));
        }
        self.inner.void_topup(reference_id).await
    }

    async fn list_topups_awaiting_void(&self, account_id: i32) -> DomainResult<Vec<TopupLogEntry>> {
        self.enter("list_topups_awaiting_void").await;
        self.inner.list_topups_awaiting_void(account_id).await
    }

    async fn record_audit_entry(&self, entry: NewAuditEntry) -> DomainResult<()> {
        self.enter("record_audit_entry").await;
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(DomainError::UpstreamUnavailable("audit store offline".into()));
        }
        self.inner.record_audit_entry(entry).await
    }

    async fn list_audit_entries(&self, subject_id: Option<i32>) -> DomainResult<Vec<AuditEntry>> {
        self.inner.list_audit_entries(subject_id).await
    }
}

/// Notifier that keeps every delivery it was asked to make.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Credentials)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, Credentials)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialNotifier for RecordingNotifier {
    async fn notify(&self, address: &str, credentials: &Credentials) -> DomainResult<DeliveryReceipt> {
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), credentials.clone()));
        Ok(DeliveryReceipt {
            message_id: format!("msg-{}", self.sent.lock().unwrap().len()),
            delivered_at: Utc::now(),
        })
    }
}

/// Notifier whose mail gateway is always down.
pub struct FailingNotifier;

#[async_trait]
impl CredentialNotifier for FailingNotifier {
    async fn notify(&self, _address: &str, _credentials: &Credentials) -> DomainResult<DeliveryReceipt> {
        Err(DomainError::UpstreamUnavailable("mail gateway down".into()))
    }
}
