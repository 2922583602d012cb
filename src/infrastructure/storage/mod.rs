//! Merchant store implementations that keep state in process memory

mod memory;

pub use memory::InMemoryMerchantStore;
