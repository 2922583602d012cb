//! CPO account aggregate
//!
//! Account entity, onboarding profile and the structured change set used by
//! profile updates.

mod dto;
pub mod model;

pub use dto::{AccountChanges, AccountField, AvailabilityField, CompanyProfile};
pub use model::{AccountStatus, CpoAccount, StatusAction};
