//! Password generation and hashing utilities

use bcrypt::{hash, verify};
use rand::Rng;

use crate::shared::errors::InfraError;

/// Generated passwords are letters only, so never numeric-only.
const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const MIN_GENERATED_LENGTH: usize = 10;

/// Generate a random login password of `length` letters (at least
/// [`MIN_GENERATED_LENGTH`]).
pub fn generate_password(length: usize) -> String {
    let length = length.max(MIN_GENERATED_LENGTH);
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, InfraError> {
    hash(password, cost).map_err(|e| InfraError::Crypto(e.to_string()))
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, InfraError> {
    verify(password, hash).map_err(|e| InfraError::Crypto(e.to_string()))
}
