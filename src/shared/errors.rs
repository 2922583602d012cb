use thiserror::Error;

use crate::domain::status;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Non-SUCCESS status reported by the store, carried verbatim.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Party identifier {0} is already allocated")]
    IdentifierConflict(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("No free party identifier for company '{0}'")]
    IdentifierExhausted(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),
}

impl DomainError {
    /// Map a store status that is not `SUCCESS` into the matching error kind.
    ///
    /// `account_id` is the account the call addressed, when there is one; a
    /// missing account is then reported as `NotFound` for that id.
    pub fn from_store_status(code: impl Into<String>, account_id: Option<i32>) -> Self {
        let code = code.into();
        match (code.as_str(), account_id) {
            (status::CPO_ACCOUNT_NOT_FOUND, Some(id)) => Self::account_not_found(id),
            _ => DomainError::Rejected(code),
        }
    }

    pub fn account_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "CpoAccount",
            field: "id",
            value: id.to_string(),
        }
    }

    /// Stable code surfaced to callers and written into audit remarks.
    pub fn status_code(&self) -> String {
        match self {
            DomainError::Validation(_) => "VALIDATION_ERROR".to_string(),
            DomainError::InvalidAmount(_) => "INVALID_AMOUNT".to_string(),
            DomainError::InvalidField(_) => "INVALID_FIELD".to_string(),
            DomainError::Rejected(code) => code.clone(),
            DomainError::IdentifierConflict(_) => status::DUPLICATE_PARTY_ID.to_string(),
            DomainError::NotFound { entity, .. } => {
                format!("{}_NOT_FOUND", to_screaming_snake(entity))
            }
            DomainError::IdentifierExhausted(_) => "PARTY_ID_EXHAUSTED".to_string(),
            DomainError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE".to_string(),
            DomainError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT".to_string(),
        }
    }

    /// Whether a fresh attempt of the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::IdentifierConflict(_) | DomainError::UpstreamUnavailable(_)
        )
    }
}

fn to_screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}
