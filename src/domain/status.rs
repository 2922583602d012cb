//! Status codes returned by the merchant store's atomic operations.
//!
//! The set is open: workflows only single out [`SUCCESS`] (and
//! [`DUPLICATE_PARTY_ID`] during registration) and carry every other value
//! verbatim as a rejection.

pub const SUCCESS: &str = "SUCCESS";
pub const NO_CHANGES_APPLIED: &str = "NO_CHANGES_APPLIED";

pub const CPO_ACCOUNT_NOT_FOUND: &str = "CPO_ACCOUNT_NOT_FOUND";
pub const CPO_ACCOUNT_INACTIVE: &str = "CPO_ACCOUNT_INACTIVE";
pub const CPO_DETAILS_ALREADY_EXISTS: &str = "CPO_DETAILS_ALREADY_EXISTS";

pub const USERNAME_EXISTS: &str = "USERNAME_EXISTS";
pub const CONTACT_NUMBER_EXISTS: &str = "CONTACT_NUMBER_EXISTS";
pub const CONTACT_EMAIL_EXISTS: &str = "CONTACT_EMAIL_EXISTS";
pub const DUPLICATE_PARTY_ID: &str = "DUPLICATE_PARTY_ID";

pub const RFID_EXISTS: &str = "RFID_EXISTS";

pub const TOPUP_NOT_FOUND: &str = "TOPUP_NOT_FOUND";
pub const TOPUP_ALREADY_VOIDED: &str = "TOPUP_ALREADY_VOIDED";
pub const VOID_WINDOW_EXPIRED: &str = "VOID_WINDOW_EXPIRED";
pub const INSUFFICIENT_BALANCE: &str = "INSUFFICIENT_BALANCE";
pub const BALANCE_OVERFLOW: &str = "BALANCE_OVERFLOW";
