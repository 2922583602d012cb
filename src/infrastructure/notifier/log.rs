//! Credential delivery through the application log
//!
//! Records that credentials were issued without handing the password over.
//! Suited to tests and dry runs; use the outbox when someone has to receive
//! the login.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{CredentialNotifier, Credentials, DeliveryReceipt, DomainResult};

#[derive(Debug, Default)]
pub struct LogNotifier {
    delivered: AtomicUsize,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deliveries made so far
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CredentialNotifier for LogNotifier {
    async fn notify(&self, address: &str, credentials: &Credentials) -> DomainResult<DeliveryReceipt> {
        let receipt = DeliveryReceipt {
            message_id: Uuid::new_v4().to_string(),
            delivered_at: Utc::now(),
        };
        self.delivered.fetch_add(1, Ordering::Relaxed);

        info!(
            to = address,
            username = %credentials.username,
            message_id = %receipt.message_id,
            "Credentials issued"
        );
        Ok(receipt)
    }
}
