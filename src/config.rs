//! Application configuration
//!
//! Loaded from TOML, by default at `~/.config/cpo-admin/config.toml`:
//!
//! ```toml
//! [database]
//! url = "sqlite://./cpo_admin.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # or "json"
//!
//! [workflow]
//! upstream_timeout_ms = 10000
//! password_length = 10
//! notification_policy = "best_effort"   # or "blocking"
//! identifier_retry_attempts = 3
//!
//! [notifier]
//! kind = "outbox"                        # or "log"
//! outbox_path = "/var/spool/cpo-admin/outbox.jsonl"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{NotificationPolicy, WorkflowSettings, MIN_PASSWORD_LENGTH};
use crate::infrastructure::{DatabaseConfig, NotifierConfig};
use crate::shared::errors::InfraError;

pub const CONFIG_DIR_NAME: &str = "cpo-admin";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `~/.config/cpo-admin/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub workflow: WorkflowConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. `info` or `cpo_admin=debug`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub upstream_timeout_ms: u64,
    pub password_length: usize,
    pub notification_policy: NotificationPolicy,
    pub identifier_retry_attempts: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let settings = WorkflowSettings::default();
        Self {
            upstream_timeout_ms: settings.upstream_timeout.as_millis() as u64,
            password_length: settings.password_length,
            notification_policy: settings.notification_policy,
            identifier_retry_attempts: settings.identifier_retry_attempts,
        }
    }
}

impl WorkflowConfig {
    pub fn to_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            upstream_timeout: Duration::from_millis(self.upstream_timeout_ms),
            password_length: self.password_length.max(MIN_PASSWORD_LENGTH),
            notification_policy: self.notification_policy,
            identifier_retry_attempts: self.identifier_retry_attempts.max(1),
        }
    }
}

impl AppConfig {
    /// Read and parse a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.database.url.trim().is_empty() {
            return Err(InfraError::InvalidConfig("database.url is empty".into()));
        }
        if self.workflow.upstream_timeout_ms == 0 {
            return Err(InfraError::InvalidConfig(
                "workflow.upstream_timeout_ms must be positive".into(),
            ));
        }
        if self.workflow.password_length < MIN_PASSWORD_LENGTH {
            return Err(InfraError::InvalidConfig(format!(
                "workflow.password_length must be at least {}",
                MIN_PASSWORD_LENGTH
            )));
        }
        if self
            .notifier
            .outbox_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(InfraError::InvalidConfig("notifier.outbox_path is empty".into()));
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "pretty" | "json") {
            return Err(InfraError::InvalidConfig(format!(
                "logging.format '{}' is not one of pretty, json",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call once at process startup. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.max_connections, 1);

        let settings = config.workflow.to_settings();
        assert_eq!(settings.upstream_timeout, Duration::from_secs(10));
        assert_eq!(settings.password_length, 10);
        assert_eq!(settings.notification_policy, NotificationPolicy::BestEffort);
        assert_eq!(settings.identifier_retry_attempts, 3);
        assert!(!config.notifier.delivers_password());
    }

    #[test]
    fn notifier_section_selects_the_outbox() {
        let config = AppConfig::from_toml(
            r#"
            [notifier]
            kind = "outbox"
            outbox_path = "/tmp/cpo-outbox.jsonl"
            "#,
        )
        .unwrap();

        assert!(config.notifier.delivers_password());
        assert_eq!(
            config.notifier.outbox_path.as_deref(),
            Some(Path::new("/tmp/cpo-outbox.jsonl"))
        );
        assert!(AppConfig::from_toml("[notifier]\nkind = \"pigeon\"").is_err());
        assert!(AppConfig::from_toml("[notifier]\noutbox_path = \"\"").is_err());
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "sqlite::memory:"

            [logging]
            format = "json"

            [workflow]
            upstream_timeout_ms = 250
            password_length = 16
            notification_policy = "blocking"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.logging.format, "json");
        let settings = config.workflow.to_settings();
        assert_eq!(settings.upstream_timeout, Duration::from_millis(250));
        assert_eq!(settings.password_length, 16);
        assert_eq!(settings.notification_policy, NotificationPolicy::Blocking);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml("[workflow]\npassword_length = 6").is_err());
        assert!(AppConfig::from_toml("[workflow]\nupstream_timeout_ms = 0").is_err());
        assert!(AppConfig::from_toml("[logging]\nformat = \"xml\"").is_err());
        assert!(AppConfig::from_toml("[workflow]\nnotification_policy = \"never\"").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/cpo-admin.toml")).unwrap_err();
        assert!(matches!(err, InfraError::Io(_)));
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("config.toml"));
    }
}
