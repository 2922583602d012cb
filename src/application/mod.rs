pub mod allocator;
pub mod audit;
pub mod context;
pub mod directory;
pub mod engine;
pub mod ledger;
pub mod registration;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types for convenience
pub use allocator::IdentifierAllocator;
pub use audit::{AuditRecorder, Audited};
pub use context::{AdminContext, NotificationPolicy, WorkflowSettings, MIN_PASSWORD_LENGTH};
pub use directory::{AccountDirectory, UpdateOutcome};
pub use engine::MerchantAdmin;
pub use ledger::LedgerService;
pub use registration::{Registration, RegistrationService};
