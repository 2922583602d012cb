use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::errors::DomainError;
use crate::shared::validations::{
    describe_errors, validate_contact_email, validate_contact_number, validate_username,
};

/// Company profile submitted when onboarding a new CPO.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyProfile {
    #[validate(length(min = 1, message = "Missing required property: cpo_owner_name"))]
    pub cpo_owner_name: String,
    #[validate(length(min = 1, message = "Missing required property: contact_name"))]
    pub contact_name: String,
    #[validate(custom(function = "validate_contact_number"))]
    pub contact_number: String,
    #[validate(custom(function = "validate_contact_email"))]
    pub contact_email: String,
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

impl CompanyProfile {
    /// Trim every field, then check formats.
    pub fn normalized(&self) -> Result<Self, DomainError> {
        let profile = Self {
            cpo_owner_name: self.cpo_owner_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
            username: self.username.trim().to_string(),
        };
        profile
            .validate()
            .map_err(|e| DomainError::Validation(describe_errors(&e)))?;
        Ok(profile)
    }
}

/// Profile columns an administrator may change after onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccountField {
    CpoOwnerName,
    ContactName,
    ContactNumber,
    ContactEmail,
    Username,
}

impl AccountField {
    pub const ALL: [AccountField; 5] = [
        AccountField::CpoOwnerName,
        AccountField::ContactName,
        AccountField::ContactNumber,
        AccountField::ContactEmail,
        AccountField::Username,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CpoOwnerName => "cpo_owner_name",
            Self::ContactName => "contact_name",
            Self::ContactNumber => "contact_number",
            Self::ContactEmail => "contact_email",
            Self::Username => "username",
        }
    }

    fn check_value(&self, value: &str) -> Result<(), DomainError> {
        if value.is_empty() {
            return Err(DomainError::Validation(format!(
                "Missing required property: {}",
                self.as_str()
            )));
        }
        let checked = match self {
            Self::ContactNumber => validate_contact_number(value),
            Self::ContactEmail => validate_contact_email(value),
            Self::Username => validate_username(value),
            Self::CpoOwnerName | Self::ContactName => Ok(()),
        };
        checked.map_err(|e| DomainError::Validation(format!("{}: {}", self.as_str(), e.code)))
    }
}

impl FromStr for AccountField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::InvalidField(s.to_string()))
    }
}

/// Structured field -> value change set. Passed to the store as
/// parameters, never rendered into query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    changes: BTreeMap<AccountField, String>,
}

impl AccountChanges {
    /// Build a change set from raw request keys.
    ///
    /// Any key outside the allow-list fails with `InvalidField` before
    /// values are looked at.
    pub fn from_request(raw: &BTreeMap<String, String>) -> Result<Self, DomainError> {
        let fields = raw
            .keys()
            .map(|k| k.parse::<AccountField>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut changes = BTreeMap::new();
        for (field, value) in fields.into_iter().zip(raw.values()) {
            let value = value.trim();
            field.check_value(value)?;
            changes.insert(field, value.to_string());
        }
        Ok(Self { changes })
    }

    pub fn set(mut self, field: AccountField, value: impl Into<String>) -> Self {
        self.changes.insert(field, value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn get(&self, field: AccountField) -> Option<&str> {
        self.changes.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccountField, &str)> {
        self.changes.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Comma separated field names, for logs and audit remarks.
    pub fn field_names(&self) -> String {
        self.changes
            .keys()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Fields that must be unique across CPO accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityField {
    Username,
    ContactNumber,
    ContactEmail,
}

impl AvailabilityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::ContactNumber => "contact_number",
            Self::ContactEmail => "contact_email",
        }
    }

    /// Format check done before asking the store.
    pub fn check_format(&self, value: &str) -> Result<(), DomainError> {
        let checked = match self {
            Self::Username => validate_username(value),
            Self::ContactNumber => validate_contact_number(value),
            Self::ContactEmail => validate_contact_email(value),
        };
        checked.map_err(|e| DomainError::Validation(e.code.to_string()))
    }
}

impl FromStr for AvailabilityField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "username" => Ok(Self::Username),
            "contact_number" => Ok(Self::ContactNumber),
            "contact_email" => Ok(Self::ContactEmail),
            other => Err(DomainError::InvalidField(other.to_string())),
        }
    }
}
