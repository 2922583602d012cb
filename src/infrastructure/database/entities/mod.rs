//! Database entities module

pub mod audit_trail;
pub mod cpo_account;
pub mod rfid_card;
pub mod topup_log;

pub use audit_trail::Entity as AuditTrail;
pub use cpo_account::Entity as CpoAccount;
pub use rfid_card::Entity as RfidCard;
pub use topup_log::Entity as TopupLog;
