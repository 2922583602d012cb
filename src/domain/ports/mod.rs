//! Outbound ports other than the store.

pub mod notifier;

pub use notifier::{CredentialNotifier, Credentials, DeliveryReceipt};
