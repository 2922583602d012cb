//! In-memory merchant store for development and testing
//!
//! Mirrors the status contract of the database store. Every mutating
//! operation runs under one write lock so that check-then-write sequences
//! (uniqueness checks, the void re-check) are atomic, the way a stored
//! procedure inside a transaction would be.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    new_reference_number, status, AccountChanges, AccountField, AccountStatus,
    AvailabilityField, AuditEntry, CompanyProfile, CpoAccount, DomainError, DomainResult,
    LedgerRow, MerchantStore, NewAuditEntry, PartyId, RegistrationRow, StatusRow, TopupKind,
    TopupLogEntry,
};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};
use crate::shared::{Clock, SystemClock};

/// bcrypt cost for the development store; production hashing lives in the
/// database store.
const MEMORY_HASH_COST: u32 = 4;

struct StoredAccount {
    account: CpoAccount,
    password_hash: String,
}

pub struct InMemoryMerchantStore {
    accounts: DashMap<i32, StoredAccount>,
    rfid_cards: DashMap<String, i32>,
    topups: DashMap<i32, TopupLogEntry>,
    audit_trail: DashMap<i32, AuditEntry>,
    account_counter: AtomicI32,
    topup_counter: AtomicI32,
    audit_counter: AtomicI32,
    write_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMerchantStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: DashMap::new(),
            rfid_cards: DashMap::new(),
            topups: DashMap::new(),
            audit_trail: DashMap::new(),
            account_counter: AtomicI32::new(1),
            topup_counter: AtomicI32::new(1),
            audit_counter: AtomicI32::new(1),
            write_lock: Mutex::new(()),
            clock,
        }
    }

    /// Start account ids at `next_id` (useful to mirror existing data).
    pub fn starting_account_id(self, next_id: i32) -> Self {
        self.account_counter.store(next_id, Ordering::SeqCst);
        self
    }

    /// Whether `password` is the login issued to `username` (case-insensitive).
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        self.accounts
            .iter()
            .find(|e| e.account.username.eq_ignore_ascii_case(username))
            .map(|e| verify_password(password, &e.password_hash).unwrap_or(false))
            .unwrap_or(false)
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| DomainError::UpstreamUnavailable("in-memory store lock poisoned".into()))
    }

    /// First uniqueness clash of `profile` with an existing account, if any.
    /// Identity fields are checked before the party id so that only a
    /// genuine party-id race yields `DUPLICATE_PARTY_ID`.
    fn registration_clash(&self, profile: &CompanyProfile, party_id: &PartyId) -> Option<&'static str> {
        let accounts: Vec<CpoAccount> = self.accounts.iter().map(|e| e.account.clone()).collect();

        if accounts
            .iter()
            .any(|a| a.username.eq_ignore_ascii_case(&profile.username))
        {
            return Some(status::USERNAME_EXISTS);
        }
        if accounts
            .iter()
            .any(|a| a.contact_email.eq_ignore_ascii_case(&profile.contact_email))
        {
            return Some(status::CONTACT_EMAIL_EXISTS);
        }
        if accounts.iter().any(|a| a.contact_number == profile.contact_number) {
            return Some(status::CONTACT_NUMBER_EXISTS);
        }
        if accounts.iter().any(|a| a.party_id == party_id.as_str()) {
            return Some(status::DUPLICATE_PARTY_ID);
        }
        None
    }

    fn value_taken(&self, field: AvailabilityField, value: &str, except_id: Option<i32>) -> bool {
        self.accounts.iter().any(|e| {
            let a = &e.account;
            if Some(a.id) == except_id {
                return false;
            }
            match field {
                AvailabilityField::Username => a.username.eq_ignore_ascii_case(value),
                AvailabilityField::ContactEmail => a.contact_email.eq_ignore_ascii_case(value),
                AvailabilityField::ContactNumber => a.contact_number == value,
            }
        })
    }

    fn sorted_accounts(&self) -> Vec<CpoAccount> {
        let mut accounts: Vec<CpoAccount> =
            self.accounts.iter().map(|e| e.account.clone()).collect();
        accounts.sort_by_key(|a| a.id);
        accounts
    }
}

impl Default for InMemoryMerchantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MerchantStore for InMemoryMerchantStore {
    async fn allocate_and_persist_account(
        &self,
        profile: &CompanyProfile,
        party_id: &PartyId,
        password: &str,
    ) -> DomainResult<RegistrationRow> {
        let password_hash = hash_password_with_cost(password, MEMORY_HASH_COST)
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let _guard = self.lock()?;
        if let Some(code) = self.registration_clash(profile, party_id) {
            return Ok(RegistrationRow::rejected(code));
        }

        let id = self.account_counter.fetch_add(1, Ordering::SeqCst);
        let account = CpoAccount {
            id,
            party_id: party_id.as_str().to_string(),
            cpo_owner_name: profile.cpo_owner_name.clone(),
            contact_name: profile.contact_name.clone(),
            contact_number: profile.contact_number.clone(),
            contact_email: profile.contact_email.clone(),
            username: profile.username.clone(),
            balance: 0,
            status: AccountStatus::Active,
            created_at: self.clock.now(),
        };
        self.accounts.insert(
            id,
            StoredAccount {
                account,
                password_hash,
            },
        );
        Ok(RegistrationRow::success(id))
    }

    async fn check_availability(
        &self,
        field: AvailabilityField,
        value: &str,
    ) -> DomainResult<StatusRow> {
        if !self.value_taken(field, value, None) {
            return Ok(StatusRow::success());
        }
        let code = match field {
            AvailabilityField::Username => status::USERNAME_EXISTS,
            AvailabilityField::ContactNumber => status::CONTACT_NUMBER_EXISTS,
            AvailabilityField::ContactEmail => status::CONTACT_EMAIL_EXISTS,
        };
        Ok(StatusRow::new(code))
    }

    async fn list_accounts(&self, limit: u64, offset: u64) -> DomainResult<Vec<CpoAccount>> {
        Ok(self
            .sorted_accounts()
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn search_accounts_by_name(&self, pattern: &str) -> DomainResult<Vec<CpoAccount>> {
        let needle = pattern.to_lowercase();
        Ok(self
            .sorted_accounts()
            .into_iter()
            .filter(|a| a.cpo_owner_name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn get_account(&self, id: i32) -> DomainResult<Option<CpoAccount>> {
        Ok(self.accounts.get(&id).map(|e| e.account.clone()))
    }

    async fn update_account(&self, id: i32, changes: &AccountChanges) -> DomainResult<u64> {
        let _guard = self.lock()?;
        if !self.accounts.contains_key(&id) {
            return Ok(0);
        }

        for (field, value) in changes.iter() {
            let unique = match field {
                AccountField::Username => Some(AvailabilityField::Username),
                AccountField::ContactEmail => Some(AvailabilityField::ContactEmail),
                AccountField::ContactNumber => Some(AvailabilityField::ContactNumber),
                AccountField::CpoOwnerName | AccountField::ContactName => None,
            };
            if let Some(unique) = unique {
                if self.value_taken(unique, value, Some(id)) {
                    return Err(DomainError::Rejected(
                        status::CPO_DETAILS_ALREADY_EXISTS.to_string(),
                    ));
                }
            }
        }

        let Some(mut stored) = self.accounts.get_mut(&id) else {
            return Ok(0);
        };
        for (field, value) in changes.iter() {
            let account = &mut stored.account;
            let value = value.to_string();
            match field {
                AccountField::CpoOwnerName => account.cpo_owner_name = value,
                AccountField::ContactName => account.contact_name = value,
                AccountField::ContactNumber => account.contact_number = value,
                AccountField::ContactEmail => account.contact_email = value,
                AccountField::Username => account.username = value,
            }
        }
        Ok(1)
    }

    async fn set_account_status(&self, id: i32, status: AccountStatus) -> DomainResult<u64> {
        let _guard = self.lock()?;
        match self.accounts.get_mut(&id) {
            Some(mut stored) if stored.account.status != status => {
                stored.account.status = status;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn add_rfid(&self, account_id: i32, rfid_card_tag: &str) -> DomainResult<StatusRow> {
        let _guard = self.lock()?;
        if !self.accounts.contains_key(&account_id) {
            return Ok(StatusRow::new(status::CPO_ACCOUNT_NOT_FOUND));
        }
        if self.rfid_cards.contains_key(rfid_card_tag) {
            return Ok(StatusRow::new(status::RFID_EXISTS));
        }
        self.rfid_cards.insert(rfid_card_tag.to_string(), account_id);
        Ok(StatusRow::success())
    }

    async fn list_allocated_party_ids(&self) -> DomainResult<Vec<PartyId>> {
        Ok(self
            .accounts
            .iter()
            .filter_map(|e| PartyId::parse(&e.account.party_id))
            .collect())
    }

    async fn topup(&self, account_id: i32, amount: i64) -> DomainResult<LedgerRow> {
        let _guard = self.lock()?;
        let Some(mut stored) = self.accounts.get_mut(&account_id) else {
            return Ok(LedgerRow::rejected(status::CPO_ACCOUNT_NOT_FOUND));
        };
        if !stored.account.is_active() {
            return Ok(LedgerRow::rejected(status::CPO_ACCOUNT_INACTIVE));
        }

        let Some(balance) = stored.account.balance.checked_add(amount) else {
            return Ok(LedgerRow::rejected(status::BALANCE_OVERFLOW));
        };
        stored.account.balance = balance;
        drop(stored);

        let id = self.topup_counter.fetch_add(1, Ordering::SeqCst);
        let reference_number = new_reference_number(TopupKind::Topup);
        self.topups.insert(
            id,
            TopupLogEntry {
                id,
                cpo_account_id: account_id,
                kind: TopupKind::Topup,
                amount,
                reference_number: reference_number.clone(),
                void_id: None,
                created_at: self.clock.now(),
            },
        );
        Ok(LedgerRow::success(account_id, balance, reference_number))
    }

    async fn void_topup(&self, reference_id: i32) -> DomainResult<LedgerRow> {
        let _guard = self.lock()?;
        let now = self.clock.now();

        let Some(original) = self.topups.get(&reference_id).map(|e| e.clone()) else {
            return Ok(LedgerRow::rejected(status::TOPUP_NOT_FOUND));
        };
        if original.kind != TopupKind::Topup {
            return Ok(LedgerRow::rejected(status::TOPUP_NOT_FOUND));
        }
        if original.is_voided() {
            return Ok(LedgerRow::rejected(status::TOPUP_ALREADY_VOIDED));
        }
        if now >= original.void_deadline() {
            return Ok(LedgerRow::rejected(status::VOID_WINDOW_EXPIRED));
        }

        let Some(mut stored) = self.accounts.get_mut(&original.cpo_account_id) else {
            return Ok(LedgerRow::rejected(status::CPO_ACCOUNT_NOT_FOUND));
        };
        let balance = match stored.account.balance.checked_sub(original.amount) {
            Some(balance) if balance >= 0 => balance,
            _ => return Ok(LedgerRow::rejected(status::INSUFFICIENT_BALANCE)),
        };
        stored.account.balance = balance;
        drop(stored);

        let void_id = self.topup_counter.fetch_add(1, Ordering::SeqCst);
        let reference_number = new_reference_number(TopupKind::Void);
        self.topups.insert(
            void_id,
            TopupLogEntry {
                id: void_id,
                cpo_account_id: original.cpo_account_id,
                kind: TopupKind::Void,
                amount: original.amount,
                reference_number: reference_number.clone(),
                void_id: None,
                created_at: now,
            },
        );
        if let Some(mut entry) = self.topups.get_mut(&reference_id) {
            entry.void_id = Some(void_id);
        }

        Ok(LedgerRow::success(
            original.cpo_account_id,
            balance,
            reference_number,
        ))
    }

    async fn list_topups_awaiting_void(&self, account_id: i32) -> DomainResult<Vec<TopupLogEntry>> {
        let now = self.clock.now();
        let mut entries: Vec<TopupLogEntry> = self
            .topups
            .iter()
            .filter(|e| e.cpo_account_id == account_id && e.is_voidable_at(now))
            .map(|e| e.clone())
            .collect();
        entries.sort_by_key(|e| (e.created_at, e.id));
        Ok(entries)
    }

    async fn record_audit_entry(&self, entry: NewAuditEntry) -> DomainResult<()> {
        let id = self.audit_counter.fetch_add(1, Ordering::SeqCst);
        self.audit_trail.insert(
            id,
            AuditEntry {
                id,
                actor_id: entry.actor_id,
                subject_id: entry.subject_id,
                action: entry.action.as_str().to_string(),
                description: entry.action.description().to_string(),
                outcome: entry.outcome,
                remark: entry.remark,
                created_at: self.clock.now(),
            },
        );
        Ok(())
    }

    async fn list_audit_entries(&self, subject_id: Option<i32>) -> DomainResult<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = self
            .audit_trail
            .iter()
            .filter(|e| subject_id.is_none() || e.subject_id == subject_id)
            .map(|e| e.clone())
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }
}
