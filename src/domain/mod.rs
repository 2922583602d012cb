pub mod account;
pub mod audit;
pub mod ledger;
pub mod party_id;
pub mod ports;
pub mod repositories;
pub mod status;

// Re-export commonly used types
pub use account::{
    AccountChanges, AccountField, AccountStatus, AvailabilityField, CompanyProfile, CpoAccount,
    StatusAction,
};
pub use audit::{AuditAction, AuditEntry, AuditOutcome, NewAuditEntry};
pub use ledger::{
    new_reference_number, TopupKind, TopupLogEntry, TopupReceipt, VoidReceipt, VOID_WINDOW_MINUTES,
};
pub use party_id::PartyId;
pub use ports::{CredentialNotifier, Credentials, DeliveryReceipt};
pub use repositories::{DomainResult, LedgerRow, MerchantStore, RegistrationRow, StatusRow};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
