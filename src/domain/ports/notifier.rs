//! Credential delivery port
//!
//! Used once per registration to send the generated username and password to
//! the company contact. Delivery is slow and fallible; whether a failure
//! blocks registration is decided by the workflow's notification policy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

/// Login credentials issued to a newly registered CPO.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub delivered_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn notify(&self, address: &str, credentials: &Credentials) -> DomainResult<DeliveryReceipt>;
}
