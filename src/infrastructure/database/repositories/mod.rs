//! Database repository implementations

pub mod merchant_repository;

pub use merchant_repository::SeaOrmMerchantStore;
