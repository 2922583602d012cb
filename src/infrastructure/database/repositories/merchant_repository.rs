//! SeaORM merchant store
//!
//! Each mutating operation runs in one database transaction; a rejection
//! status returns before commit and the dropped transaction rolls back.

use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::DEFAULT_COST;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, error};

use crate::domain::{
    new_reference_number, status, AccountChanges, AccountField, AccountStatus, AuditEntry,
    AuditOutcome, AvailabilityField, CompanyProfile, CpoAccount, DomainError, DomainResult,
    LedgerRow, MerchantStore, NewAuditEntry, PartyId, RegistrationRow, StatusRow, TopupKind,
    TopupLogEntry,
};
use crate::infrastructure::crypto::password::hash_password_with_cost;
use crate::infrastructure::database::entities::{audit_trail, cpo_account, rfid_card, topup_log};
use crate::shared::{Clock, SystemClock};

pub struct SeaOrmMerchantStore {
    db: DatabaseConnection,
    hash_cost: u32,
    clock: Arc<dyn Clock>,
}

impl SeaOrmMerchantStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            hash_cost: DEFAULT_COST,
            clock: Arc::new(SystemClock),
        }
    }

    /// bcrypt cost used for new account passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn begin(&self) -> DomainResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn status_to_domain(status: cpo_account::AccountStatus) -> AccountStatus {
    match status {
        cpo_account::AccountStatus::Active => AccountStatus::Active,
        cpo_account::AccountStatus::Inactive => AccountStatus::Inactive,
    }
}

fn status_to_entity(status: AccountStatus) -> cpo_account::AccountStatus {
    match status {
        AccountStatus::Active => cpo_account::AccountStatus::Active,
        AccountStatus::Inactive => cpo_account::AccountStatus::Inactive,
    }
}

fn kind_to_domain(kind: topup_log::EntryKind) -> TopupKind {
    match kind {
        topup_log::EntryKind::Topup => TopupKind::Topup,
        topup_log::EntryKind::Void => TopupKind::Void,
    }
}

fn account_model_to_domain(model: cpo_account::Model) -> CpoAccount {
    CpoAccount {
        id: model.id,
        party_id: model.party_id,
        cpo_owner_name: model.cpo_owner_name,
        contact_name: model.contact_name,
        contact_number: model.contact_number,
        contact_email: model.contact_email,
        username: model.username,
        balance: model.balance,
        status: status_to_domain(model.status),
        created_at: model.created_at,
    }
}

fn topup_model_to_domain(model: topup_log::Model) -> TopupLogEntry {
    TopupLogEntry {
        id: model.id,
        cpo_account_id: model.cpo_account_id,
        kind: kind_to_domain(model.kind),
        amount: model.amount,
        reference_number: model.reference_number,
        void_id: model.void_id,
        created_at: model.created_at,
    }
}

fn audit_model_to_domain(model: audit_trail::Model) -> DomainResult<AuditEntry> {
    let outcome = model.outcome.parse::<AuditOutcome>().map_err(|e| {
        error!(audit_id = model.id, error = %e, "Corrupt audit row");
        DomainError::UpstreamUnavailable("merchant database".to_string())
    })?;
    Ok(AuditEntry {
        id: model.id,
        actor_id: model.actor_id,
        subject_id: model.subject_id,
        action: model.action,
        description: model.description,
        outcome,
        remark: model.remark,
        created_at: model.created_at,
    })
}

/// Database failures surface as an unavailable upstream; the query text
/// stays in the log.
fn db_err(e: DbErr) -> DomainError {
    error!(error = %e, "Database call failed");
    DomainError::UpstreamUnavailable("merchant database".to_string())
}

fn is_unique_violation(e: &DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("UNIQUE") || msg.contains("duplicate")
}

/// Map a unique-index violation on registration to the matching status.
fn registration_conflict(e: &DbErr) -> Option<&'static str> {
    if !is_unique_violation(e) {
        return None;
    }
    let msg = e.to_string();
    let code = if msg.contains("party_id") {
        status::DUPLICATE_PARTY_ID
    } else if msg.contains("username") {
        status::USERNAME_EXISTS
    } else if msg.contains("contact_email") {
        status::CONTACT_EMAIL_EXISTS
    } else if msg.contains("contact_number") {
        status::CONTACT_NUMBER_EXISTS
    } else {
        status::CPO_DETAILS_ALREADY_EXISTS
    };
    Some(code)
}

fn unique_column(field: AvailabilityField) -> cpo_account::Column {
    match field {
        AvailabilityField::Username => cpo_account::Column::Username,
        AvailabilityField::ContactNumber => cpo_account::Column::ContactNumber,
        AvailabilityField::ContactEmail => cpo_account::Column::ContactEmail,
    }
}

fn taken_status(field: AvailabilityField) -> &'static str {
    match field {
        AvailabilityField::Username => status::USERNAME_EXISTS,
        AvailabilityField::ContactNumber => status::CONTACT_NUMBER_EXISTS,
        AvailabilityField::ContactEmail => status::CONTACT_EMAIL_EXISTS,
    }
}

/// Escape LIKE wildcards so the pattern matches literally.
fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Whether `value` is already used in `field` by an account other than
/// `except_id`. Username and email compare case-insensitively.
async fn value_taken<C: sea_orm::ConnectionTrait>(
    conn: &C,
    field: AvailabilityField,
    value: &str,
    except_id: Option<i32>,
) -> DomainResult<bool> {
    let column = unique_column(field);
    let mut query = cpo_account::Entity::find();
    query = match field {
        AvailabilityField::ContactNumber => query.filter(column.eq(value)),
        AvailabilityField::Username | AvailabilityField::ContactEmail => query.filter(
            Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase()),
        ),
    };
    if let Some(id) = except_id {
        query = query.filter(cpo_account::Column::Id.ne(id));
    }
    Ok(query.count(conn).await.map_err(db_err)? > 0)
}

// ── Store implementation ────────────────────────────────────────

#[async_trait]
impl MerchantStore for SeaOrmMerchantStore {
    async fn allocate_and_persist_account(
        &self,
        profile: &CompanyProfile,
        party_id: &PartyId,
        password: &str,
    ) -> DomainResult<RegistrationRow> {
        let password = password.to_string();
        let cost = self.hash_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("password hashing aborted: {}", e)))?
            .map_err(|e| DomainError::UpstreamUnavailable(e.to_string()))?;

        let txn = self.begin().await?;

        for (field, value) in [
            (AvailabilityField::Username, profile.username.as_str()),
            (AvailabilityField::ContactEmail, profile.contact_email.as_str()),
            (AvailabilityField::ContactNumber, profile.contact_number.as_str()),
        ] {
            if value_taken(&txn, field, value, None).await? {
                return Ok(RegistrationRow::rejected(taken_status(field)));
            }
        }

        let party_taken = cpo_account::Entity::find()
            .filter(cpo_account::Column::PartyId.eq(party_id.as_str()))
            .count(&txn)
            .await
            .map_err(db_err)?;
        if party_taken > 0 {
            return Ok(RegistrationRow::rejected(status::DUPLICATE_PARTY_ID));
        }

        let now = self.clock.now();
        let account = cpo_account::ActiveModel {
            party_id: Set(party_id.as_str().to_string()),
            cpo_owner_name: Set(profile.cpo_owner_name.clone()),
            contact_name: Set(profile.contact_name.clone()),
            contact_number: Set(profile.contact_number.clone()),
            contact_email: Set(profile.contact_email.clone()),
            username: Set(profile.username.clone()),
            password_hash: Set(password_hash),
            balance: Set(0),
            status: Set(cpo_account::AccountStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = match account.insert(&txn).await {
            Ok(model) => model,
            Err(e) => match registration_conflict(&e) {
                Some(code) => return Ok(RegistrationRow::rejected(code)),
                None => return Err(db_err(e)),
            },
        };

        txn.commit().await.map_err(db_err)?;
        debug!(account_id = inserted.id, party_id = %party_id, "CPO account persisted");
        Ok(RegistrationRow::success(inserted.id))
    }

    async fn check_availability(
        &self,
        field: AvailabilityField,
        value: &str,
    ) -> DomainResult<StatusRow> {
        if value_taken(&self.db, field, value, None).await? {
            Ok(StatusRow::new(taken_status(field)))
        } else {
            Ok(StatusRow::success())
        }
    }

    async fn list_accounts(&self, limit: u64, offset: u64) -> DomainResult<Vec<CpoAccount>> {
        let models = cpo_account::Entity::find()
            .order_by_asc(cpo_account::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(account_model_to_domain).collect())
    }

    async fn search_accounts_by_name(&self, pattern: &str) -> DomainResult<Vec<CpoAccount>> {
        let like = format!("%{}%", escape_like(&pattern.to_lowercase()));
        let models = cpo_account::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(cpo_account::Column::CpoOwnerName)))
                    .like(LikeExpr::new(like).escape('\\')),
            )
            .order_by_asc(cpo_account::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(account_model_to_domain).collect())
    }

    async fn get_account(&self, id: i32) -> DomainResult<Option<CpoAccount>> {
        let model = cpo_account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(account_model_to_domain))
    }

    async fn update_account(&self, id: i32, changes: &AccountChanges) -> DomainResult<u64> {
        let txn = self.begin().await?;

        for (field, value) in changes.iter() {
            let unique = match field {
                AccountField::Username => Some(AvailabilityField::Username),
                AccountField::ContactEmail => Some(AvailabilityField::ContactEmail),
                AccountField::ContactNumber => Some(AvailabilityField::ContactNumber),
                AccountField::CpoOwnerName | AccountField::ContactName => None,
            };
            if let Some(unique) = unique {
                if value_taken(&txn, unique, value, Some(id)).await? {
                    return Err(DomainError::Rejected(
                        status::CPO_DETAILS_ALREADY_EXISTS.to_string(),
                    ));
                }
            }
        }

        let mut update = cpo_account::Entity::update_many()
            .col_expr(cpo_account::Column::UpdatedAt, Expr::value(self.clock.now()));
        for (field, value) in changes.iter() {
            let column = match field {
                AccountField::CpoOwnerName => cpo_account::Column::CpoOwnerName,
                AccountField::ContactName => cpo_account::Column::ContactName,
                AccountField::ContactNumber => cpo_account::Column::ContactNumber,
                AccountField::ContactEmail => cpo_account::Column::ContactEmail,
                AccountField::Username => cpo_account::Column::Username,
            };
            update = update.col_expr(column, Expr::value(value.to_string()));
        }

        let result = update
            .filter(cpo_account::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Rejected(status::CPO_DETAILS_ALREADY_EXISTS.to_string())
                } else {
                    db_err(e)
                }
            })?;

        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn set_account_status(&self, id: i32, status: AccountStatus) -> DomainResult<u64> {
        let target = status_to_entity(status);
        let result = cpo_account::Entity::update_many()
            .col_expr(cpo_account::Column::Status, Expr::value(target))
            .col_expr(cpo_account::Column::UpdatedAt, Expr::value(self.clock.now()))
            .filter(cpo_account::Column::Id.eq(id))
            .filter(cpo_account::Column::Status.ne(target))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn add_rfid(&self, account_id: i32, rfid_card_tag: &str) -> DomainResult<StatusRow> {
        let txn = self.begin().await?;

        let account = cpo_account::Entity::find_by_id(account_id)
            .one(&txn)
            .await
            .map_err(db_err)?;
        if account.is_none() {
            return Ok(StatusRow::new(status::CPO_ACCOUNT_NOT_FOUND));
        }

        let existing = rfid_card::Entity::find()
            .filter(rfid_card::Column::RfidCardTag.eq(rfid_card_tag))
            .count(&txn)
            .await
            .map_err(db_err)?;
        if existing > 0 {
            return Ok(StatusRow::new(status::RFID_EXISTS));
        }

        let card = rfid_card::ActiveModel {
            cpo_account_id: Set(account_id),
            rfid_card_tag: Set(rfid_card_tag.to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        };
        if let Err(e) = card.insert(&txn).await {
            if is_unique_violation(&e) {
                return Ok(StatusRow::new(status::RFID_EXISTS));
            }
            return Err(db_err(e));
        }

        txn.commit().await.map_err(db_err)?;
        Ok(StatusRow::success())
    }

    async fn list_allocated_party_ids(&self) -> DomainResult<Vec<PartyId>> {
        let ids: Vec<String> = cpo_account::Entity::find()
            .select_only()
            .column(cpo_account::Column::PartyId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.iter().filter_map(|id| PartyId::parse(id)).collect())
    }

    async fn topup(&self, account_id: i32, amount: i64) -> DomainResult<LedgerRow> {
        let txn = self.begin().await?;

        let Some(account) = cpo_account::Entity::find_by_id(account_id)
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(LedgerRow::rejected(status::CPO_ACCOUNT_NOT_FOUND));
        };
        if account.status != cpo_account::AccountStatus::Active {
            return Ok(LedgerRow::rejected(status::CPO_ACCOUNT_INACTIVE));
        }
        if account.balance.checked_add(amount).is_none() {
            return Ok(LedgerRow::rejected(status::BALANCE_OVERFLOW));
        }

        let now = self.clock.now();
        cpo_account::Entity::update_many()
            .col_expr(
                cpo_account::Column::Balance,
                Expr::col(cpo_account::Column::Balance).add(amount),
            )
            .col_expr(cpo_account::Column::UpdatedAt, Expr::value(now))
            .filter(cpo_account::Column::Id.eq(account_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let reference_number = new_reference_number(TopupKind::Topup);
        topup_log::ActiveModel {
            cpo_account_id: Set(account_id),
            kind: Set(topup_log::EntryKind::Topup),
            amount: Set(amount),
            reference_number: Set(reference_number.clone()),
            void_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let balance = current_balance(&txn, account_id).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(LedgerRow::success(account_id, balance, reference_number))
    }

    async fn void_topup(&self, reference_id: i32) -> DomainResult<LedgerRow> {
        let txn = self.begin().await?;
        let now = self.clock.now();

        let original = match topup_log::Entity::find_by_id(reference_id)
            .one(&txn)
            .await
            .map_err(db_err)?
        {
            Some(model) if model.kind == topup_log::EntryKind::Topup => topup_model_to_domain(model),
            _ => return Ok(LedgerRow::rejected(status::TOPUP_NOT_FOUND)),
        };
        if original.is_voided() {
            return Ok(LedgerRow::rejected(status::TOPUP_ALREADY_VOIDED));
        }
        if now >= original.void_deadline() {
            return Ok(LedgerRow::rejected(status::VOID_WINDOW_EXPIRED));
        }

        let account_id = original.cpo_account_id;
        if current_balance(&txn, account_id).await? < original.amount {
            return Ok(LedgerRow::rejected(status::INSUFFICIENT_BALANCE));
        }

        let reference_number = new_reference_number(TopupKind::Void);
        let void_row = topup_log::ActiveModel {
            cpo_account_id: Set(account_id),
            kind: Set(topup_log::EntryKind::Void),
            amount: Set(original.amount),
            reference_number: Set(reference_number.clone()),
            void_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        // Claim the top-up; a concurrent void that got here first wins.
        let claimed = topup_log::Entity::update_many()
            .col_expr(topup_log::Column::VoidId, Expr::value(void_row.id))
            .filter(topup_log::Column::Id.eq(reference_id))
            .filter(topup_log::Column::VoidId.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if claimed.rows_affected == 0 {
            return Ok(LedgerRow::rejected(status::TOPUP_ALREADY_VOIDED));
        }

        cpo_account::Entity::update_many()
            .col_expr(
                cpo_account::Column::Balance,
                Expr::col(cpo_account::Column::Balance).sub(original.amount),
            )
            .col_expr(cpo_account::Column::UpdatedAt, Expr::value(now))
            .filter(cpo_account::Column::Id.eq(account_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let balance = current_balance(&txn, account_id).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(LedgerRow::success(account_id, balance, reference_number))
    }

    async fn list_topups_awaiting_void(&self, account_id: i32) -> DomainResult<Vec<TopupLogEntry>> {
        let now = self.clock.now();
        let models = topup_log::Entity::find()
            .filter(topup_log::Column::CpoAccountId.eq(account_id))
            .filter(topup_log::Column::Kind.eq(topup_log::EntryKind::Topup))
            .filter(topup_log::Column::VoidId.is_null())
            .order_by_asc(topup_log::Column::CreatedAt)
            .order_by_asc(topup_log::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models
            .into_iter()
            .map(topup_model_to_domain)
            .filter(|e| e.is_voidable_at(now))
            .collect())
    }

    async fn record_audit_entry(&self, entry: NewAuditEntry) -> DomainResult<()> {
        audit_trail::ActiveModel {
            actor_id: Set(entry.actor_id),
            subject_id: Set(entry.subject_id),
            action: Set(entry.action.as_str().to_string()),
            description: Set(entry.action.description().to_string()),
            outcome: Set(entry.outcome.as_str().to_string()),
            remark: Set(entry.remark),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_audit_entries(&self, subject_id: Option<i32>) -> DomainResult<Vec<AuditEntry>> {
        let mut query = audit_trail::Entity::find();
        if let Some(id) = subject_id {
            query = query.filter(audit_trail::Column::SubjectId.eq(id));
        }
        let models = query
            .order_by_asc(audit_trail::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(audit_model_to_domain).collect()
    }
}

async fn current_balance(txn: &DatabaseTransaction, account_id: i32) -> DomainResult<i64> {
    cpo_account::Entity::find_by_id(account_id)
        .one(txn)
        .await
        .map_err(db_err)?
        .map(|a| a.balance)
        .ok_or_else(|| DomainError::account_not_found(account_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuditAction;
    use crate::infrastructure::database::{init_database, run_migrations, DatabaseConfig};
    use crate::shared::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    async fn store_with_clock(clock: Arc<dyn Clock>) -> SeaOrmMerchantStore {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&db).await.unwrap();
        SeaOrmMerchantStore::new(db).with_hash_cost(4).with_clock(clock)
    }

    async fn store() -> SeaOrmMerchantStore {
        store_with_clock(Arc::new(SystemClock)).await
    }

    fn profile(name: &str, username: &str, email: &str, number: &str) -> CompanyProfile {
        CompanyProfile {
            cpo_owner_name: name.into(),
            contact_name: "Ana Cruz".into(),
            contact_number: number.into(),
            contact_email: email.into(),
            username: username.into(),
        }
    }

    fn green() -> CompanyProfile {
        profile("GreenCharge", "greencharge", "ops@greencharge.ph", "09112231123")
    }

    async fn register(store: &SeaOrmMerchantStore, p: &CompanyProfile, party: &str) -> RegistrationRow {
        store
            .allocate_and_persist_account(p, &PartyId::parse(party).unwrap(), "SecretPass")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn registration_persists_a_hashed_password() {
        let store = store().await;
        let row = register(&store, &green(), "GRE").await;
        assert_eq!(row.status, "SUCCESS");
        let id = row.account_id.unwrap();

        let model = cpo_account::Entity::find_by_id(id)
            .one(store.connection())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(model.password_hash, "SecretPass");
        assert!(crate::infrastructure::crypto::password::verify_password(
            "SecretPass",
            &model.password_hash
        )
        .unwrap());

        let account = store.get_account(id).await.unwrap().unwrap();
        assert_eq!(account.party_id, "GRE");
        assert_eq!(account.balance, 0);
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn registration_reports_clashes_in_order() {
        let store = store().await;
        register(&store, &green(), "GRE").await;

        let same_user = profile("Other", "GreenCharge", "a@b.ph", "09000000001");
        assert_eq!(register(&store, &same_user, "OTH").await.status, "USERNAME_EXISTS");

        let same_email = profile("Other", "other", "OPS@greencharge.ph", "09000000001");
        assert_eq!(register(&store, &same_email, "OTH").await.status, "CONTACT_EMAIL_EXISTS");

        let same_number = profile("Other", "other", "a@b.ph", "09112231123");
        assert_eq!(register(&store, &same_number, "OTH").await.status, "CONTACT_NUMBER_EXISTS");

        let same_party = profile("Green Energy", "other", "a@b.ph", "09000000001");
        assert_eq!(register(&store, &same_party, "GRE").await.status, "DUPLICATE_PARTY_ID");

        assert_eq!(store.list_allocated_party_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn availability_checks_each_unique_field() {
        let store = store().await;
        register(&store, &green(), "GRE").await;

        let row = store
            .check_availability(AvailabilityField::Username, "greencharge")
            .await
            .unwrap();
        assert_eq!(row.status, "USERNAME_EXISTS");
        assert!(store
            .check_availability(AvailabilityField::ContactNumber, "09998887777")
            .await
            .unwrap()
            .is_success());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let store = store().await;
        register(&store, &green(), "GRE").await;
        register(
            &store,
            &profile("Volt_Hub", "volthub", "ops@volthub.ph", "09000000002"),
            "VOL",
        )
        .await;

        let found = store.search_accounts_by_name("charge").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].cpo_owner_name, "GreenCharge");

        // `_` is a literal underscore, not a wildcard
        assert_eq!(store.search_accounts_by_name("t_h").await.unwrap().len(), 1);
        assert!(store.search_accounts_by_name("n_c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_pages_by_id() {
        let store = store().await;
        register(&store, &green(), "GRE").await;
        register(
            &store,
            &profile("Volt Hub", "volthub", "ops@volthub.ph", "09000000002"),
            "VOL",
        )
        .await;

        let first = store.list_accounts(1, 0).await.unwrap();
        let second = store.list_accounts(1, 1).await.unwrap();
        assert_eq!(first[0].party_id, "GRE");
        assert_eq!(second[0].party_id, "VOL");
    }

    #[tokio::test]
    async fn update_writes_only_listed_fields() {
        let store = store().await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();
        register(
            &store,
            &profile("Volt Hub", "volthub", "ops@volthub.ph", "09000000002"),
            "VOL",
        )
        .await;

        let changes = AccountChanges::default().set(AccountField::ContactName, "Ben Reyes");
        assert_eq!(store.update_account(id, &changes).await.unwrap(), 1);
        let account = store.get_account(id).await.unwrap().unwrap();
        assert_eq!(account.contact_name, "Ben Reyes");
        assert_eq!(account.username, "greencharge");

        let clash = AccountChanges::default().set(AccountField::Username, "volthub");
        assert!(matches!(
            store.update_account(id, &clash).await,
            Err(DomainError::Rejected(ref s)) if s == "CPO_DETAILS_ALREADY_EXISTS"
        ));

        assert_eq!(store.update_account(999, &changes).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn status_changes_report_affected_rows() {
        let store = store().await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();

        assert_eq!(store.set_account_status(id, AccountStatus::Active).await.unwrap(), 0);
        assert_eq!(store.set_account_status(id, AccountStatus::Inactive).await.unwrap(), 1);
        assert_eq!(
            store.topup(id, 100).await.unwrap().status,
            "CPO_ACCOUNT_INACTIVE"
        );
    }

    #[tokio::test]
    async fn topup_past_the_balance_limit_is_rejected() {
        let store = store().await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();

        assert_eq!(store.topup(id, i64::MAX).await.unwrap().current_balance, Some(i64::MAX));
        assert_eq!(store.topup(id, 1).await.unwrap().status, "BALANCE_OVERFLOW");
        assert_eq!(current_balance_of(&store, id).await, i64::MAX);
        assert_eq!(store.list_topups_awaiting_void(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_audit_outcome_is_reported_not_guessed() {
        let store = store().await;
        audit_trail::ActiveModel {
            actor_id: Set("admin".into()),
            subject_id: Set(Some(1)),
            action: Set("TOPUP".into()),
            description: Set("Top up CPO balance".into()),
            outcome: Set("MAYBE".into()),
            remark: Set("SUCCESS".into()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(store.connection())
        .await
        .unwrap();

        let err = store.list_audit_entries(None).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    async fn current_balance_of(store: &SeaOrmMerchantStore, id: i32) -> i64 {
        store.get_account(id).await.unwrap().unwrap().balance
    }

    #[tokio::test]
    async fn rfid_tags_are_unique() {
        let store = store().await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();

        assert!(store.add_rfid(id, "RF-0001").await.unwrap().is_success());
        assert_eq!(store.add_rfid(id, "RF-0001").await.unwrap().status, "RFID_EXISTS");
        assert_eq!(
            store.add_rfid(999, "RF-0002").await.unwrap().status,
            "CPO_ACCOUNT_NOT_FOUND"
        );
    }

    #[tokio::test]
    async fn topup_and_void_keep_the_ledger_consistent() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
        ));
        let store = store_with_clock(clock.clone()).await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();

        let row = store.topup(id, 500).await.unwrap();
        assert_eq!(row.current_balance, Some(500));
        store.topup(id, 100).await.unwrap();

        let pending = store.list_topups_awaiting_void(id).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].amount, 500);

        let row = store.void_topup(pending[0].id).await.unwrap();
        assert_eq!(row.status, "SUCCESS");
        assert_eq!(row.current_balance, Some(100));
        assert!(row.reference_number.unwrap().starts_with("VOD-"));

        let again = store.void_topup(pending[0].id).await.unwrap();
        assert_eq!(again.status, "TOPUP_ALREADY_VOIDED");

        clock.advance(Duration::minutes(60));
        assert!(store.list_topups_awaiting_void(id).await.unwrap().is_empty());
        assert_eq!(
            store.void_topup(pending[1].id).await.unwrap().status,
            "VOID_WINDOW_EXPIRED"
        );
        assert_eq!(store.void_topup(9999).await.unwrap().status, "TOPUP_NOT_FOUND");
    }

    #[tokio::test]
    async fn void_never_drives_the_balance_negative() {
        let store = store().await;
        let id = register(&store, &green(), "GRE").await.account_id.unwrap();
        store.topup(id, 300).await.unwrap();
        let reference_id = store.list_topups_awaiting_void(id).await.unwrap()[0].id;

        // Simulate the balance having been spent
        cpo_account::Entity::update_many()
            .col_expr(cpo_account::Column::Balance, Expr::value(100i64))
            .filter(cpo_account::Column::Id.eq(id))
            .exec(store.connection())
            .await
            .unwrap();

        let row = store.void_topup(reference_id).await.unwrap();
        assert_eq!(row.status, "INSUFFICIENT_BALANCE");
        assert_eq!(store.get_account(id).await.unwrap().unwrap().balance, 100);
    }

    #[tokio::test]
    async fn audit_entries_round_trip() {
        let store = store().await;
        store
            .record_audit_entry(NewAuditEntry {
                actor_id: "admin-1".into(),
                subject_id: Some(3),
                action: AuditAction::Topup,
                outcome: AuditOutcome::Failed,
                remark: "INVALID_AMOUNT".into(),
            })
            .await
            .unwrap();
        store
            .record_audit_entry(NewAuditEntry {
                actor_id: "admin-1".into(),
                subject_id: None,
                action: AuditAction::RegisterCpo,
                outcome: AuditOutcome::Failed,
                remark: "VALIDATION_ERROR".into(),
            })
            .await
            .unwrap();

        let all = store.list_audit_entries(None).await.unwrap();
        assert_eq!(all.len(), 2);
        let scoped = store.list_audit_entries(Some(3)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].action, "TOPUP");
        assert_eq!(scoped[0].description, "Top up CPO balance");
        assert_eq!(scoped[0].outcome, AuditOutcome::Failed);
    }
}
