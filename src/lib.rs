//! # CPO Merchant Administration
//!
//! Administrative workflows for Charging Point Operator (CPO) merchant
//! accounts on an EV charging platform: onboarding with party-id allocation,
//! profile maintenance, RFID issuance, and a prepaid balance ledger with a
//! short void window. Every mutating action leaves one audit entry.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, status codes and the store / notifier ports
//! - **application**: Workflows (registration, directory, ledger) and audit
//! - **infrastructure**: SeaORM and in-memory stores, crypto, notifiers
//! - **shared**: Errors, retry, clock and field validation

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, init_tracing, AppConfig};

pub use application::{AdminContext, MerchantAdmin, NotificationPolicy, WorkflowSettings};
pub use infrastructure::{
    build_notifier, init_database, DatabaseConfig, InMemoryMerchantStore, LogNotifier, Migrator,
    NotifierConfig, OutboxNotifier, SeaOrmMerchantStore,
};
