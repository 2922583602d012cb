//! Party identifier: the 3-character company code used in OCPI-style
//! roaming identifiers (e.g. `PH*GRE`).

use std::collections::HashSet;

use serde::Serialize;

use crate::shared::errors::DomainError;

pub const PARTY_ID_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Accepts exactly three ASCII alphanumerics, normalised to uppercase.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() == PARTY_ID_LEN && value.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(Self(value.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a party identifier from a company name.
///
/// The name is stripped of whitespace and anything that is not an ASCII
/// alphanumeric, then uppercased. The first two characters are a fixed
/// prefix; the third is the first later character whose candidate is not in
/// `existing`. Deterministic for a given name and snapshot.
pub fn allocate(company_name: &str, existing: &HashSet<PartyId>) -> Result<PartyId, DomainError> {
    let letters: Vec<char> = company_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if letters.len() < PARTY_ID_LEN {
        return Err(DomainError::IdentifierExhausted(company_name.to_string()));
    }

    let prefix: String = letters[..2].iter().collect();

    letters[2..]
        .iter()
        .map(|c| PartyId(format!("{}{}", prefix, c)))
        .find(|candidate| !existing.contains(candidate))
        .ok_or_else(|| DomainError::IdentifierExhausted(company_name.to_string()))
}
