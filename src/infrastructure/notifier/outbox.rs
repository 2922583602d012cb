//! Credential delivery into a local outbox file
//!
//! Each delivery appends one JSON line holding the recipient and the full
//! login. A mail relay (or an operator) picks the messages up from there.
//! On unix the file is created owner-read/write only.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{CredentialNotifier, Credentials, DeliveryReceipt, DomainError, DomainResult};
use crate::shared::errors::InfraError;

pub const OUTBOX_SUBJECT: &str = "Your CPO account credentials";

/// One queued credential message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub message_id: String,
    pub to: String,
    pub subject: String,
    pub username: String,
    pub password: String,
    pub queued_at: DateTime<Utc>,
}

pub struct OutboxNotifier {
    path: PathBuf,
    // Serializes appends from concurrent registrations.
    append_lock: Mutex<()>,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, message: &OutboxMessage) -> Result<(), InfraError> {
        let _guard = self.append_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Read every message queued in the outbox at `path`, oldest first.
pub async fn read_outbox(path: &Path) -> Result<Vec<OutboxMessage>, InfraError> {
    let raw = tokio::fs::read_to_string(path).await?;
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(InfraError::from))
        .collect()
}

#[async_trait]
impl CredentialNotifier for OutboxNotifier {
    async fn notify(&self, address: &str, credentials: &Credentials) -> DomainResult<DeliveryReceipt> {
        let message = OutboxMessage {
            message_id: Uuid::new_v4().to_string(),
            to: address.to_string(),
            subject: OUTBOX_SUBJECT.to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            queued_at: Utc::now(),
        };

        if let Err(e) = self.append(&message).await {
            error!(outbox = %self.path.display(), error = %e, "Failed to queue credentials");
            return Err(DomainError::UpstreamUnavailable("credential outbox".to_string()));
        }

        info!(
            to = address,
            username = %credentials.username,
            message_id = %message.message_id,
            outbox = %self.path.display(),
            "Credentials queued"
        );
        Ok(DeliveryReceipt {
            message_id: message.message_id,
            delivered_at: message.queued_at,
        })
    }
}
