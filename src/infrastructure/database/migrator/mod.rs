//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_cpo_accounts;
mod m20240101_000002_create_rfid_cards;
mod m20240101_000003_create_topup_logs;
mod m20240101_000004_create_audit_trails;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_cpo_accounts::Migration),
            Box::new(m20240101_000002_create_rfid_cards::Migration),
            Box::new(m20240101_000003_create_topup_logs::Migration),
            Box::new(m20240101_000004_create_audit_trails::Migration),
        ]
    }
}
