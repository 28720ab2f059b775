//! Password hashing and verification using bcrypt
//!
//! bcrypt only keys on the first 72 bytes of input, so both hashing and
//! verification truncate to that limit up front. Verification of a very long
//! password therefore only checks the truncated prefix - a known, accepted
//! simplification.

use bcrypt::DEFAULT_COST;

use crate::types::{ApiError, Result};

/// Maximum effective bcrypt input length in bytes
const MAX_PASSWORD_BYTES: usize = 72;

fn truncated(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hash a password with a fresh random salt.
///
/// Returns the modular-crypt formatted digest that embeds the salt and cost.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(truncated(password), DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

/// Verify a password against a stored digest.
///
/// Returns false for a non-matching password and for a malformed digest -
/// callers never need to handle an error here.
pub fn verify_password(password: &str, digest: &str) -> bool {
    bcrypt::verify(truncated(password), digest).unwrap_or(false)
}
