//! Credential notifier adapters

mod log;
mod outbox;

pub use log::LogNotifier;
pub use outbox::{read_outbox, OutboxMessage, OutboxNotifier, OUTBOX_SUBJECT};

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::CredentialNotifier;

pub const OUTBOX_FILE_NAME: &str = "outbox.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    /// Log the delivery only; the password is not handed to anyone.
    #[default]
    Log,
    /// Queue the full login in an outbox file.
    Outbox,
}

/// Notifier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub kind: NotifierKind,
    /// Outbox file; defaults to `outbox.jsonl` next to the config file.
    pub outbox_path: Option<PathBuf>,
}

impl NotifierConfig {
    pub fn outbox(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: NotifierKind::Outbox,
            outbox_path: Some(path.into()),
        }
    }

    /// Whether the configured notifier hands the password to the recipient.
    pub fn delivers_password(&self) -> bool {
        self.kind == NotifierKind::Outbox
    }
}

/// Build the notifier selected by `config`. `default_dir` holds the outbox
/// when no path is configured.
pub fn build_notifier(config: &NotifierConfig, default_dir: &std::path::Path) -> Arc<dyn CredentialNotifier> {
    match config.kind {
        NotifierKind::Log => Arc::new(LogNotifier::new()),
        NotifierKind::Outbox => {
            let path = config
                .outbox_path
                .clone()
                .unwrap_or_else(|| default_dir.join(OUTBOX_FILE_NAME));
            Arc::new(OutboxNotifier::new(path))
        }
    }
}
