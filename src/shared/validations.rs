//! Field format rules shared by registration, availability checks and
//! profile updates.

use std::borrow::Cow;

use validator::{ValidateEmail, ValidationError, ValidationErrors};

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Ok(());
    }
    Err(ValidationError::new("INVALID_USERNAME").with_message(Cow::Borrowed(
        "Username must only contain letters, numbers, and underscores",
    )))
}

/// Philippine mobile numbers: `+639XXXXXXXXX` or `09XXXXXXXXX`.
pub fn validate_contact_number(number: &str) -> Result<(), ValidationError> {
    let rest = number
        .strip_prefix("+639")
        .or_else(|| number.strip_prefix("09"));

    match rest {
        Some(digits) if digits.len() == 9 && digits.chars().all(|c| c.is_ascii_digit()) => Ok(()),
        _ => Err(
            ValidationError::new("INVALID_CONTACT_NUMBER").with_message(Cow::Borrowed(
                "Contact number must be a valid number (e.g. +639112231123 or 09112231123)",
            )),
        ),
    }
}

pub fn validate_contact_email(email: &str) -> Result<(), ValidationError> {
    if email.validate_email() {
        return Ok(());
    }
    Err(ValidationError::new("INVALID_CONTACT_EMAIL").with_message(Cow::Borrowed(
        "Contact email must be a valid email (e.g. email@gmail.com)",
    )))
}

/// Flatten validator errors into one line: `field: CODE (message); ...`.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {} ({})", field, e.code, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
