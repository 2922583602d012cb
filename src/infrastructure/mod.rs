//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod notifier;
pub mod storage;

pub use database::{init_database, DatabaseConfig, Migrator, SeaOrmMerchantStore};
pub use notifier::{build_notifier, LogNotifier, NotifierConfig, NotifierKind, OutboxNotifier};
pub use storage::InMemoryMerchantStore;
