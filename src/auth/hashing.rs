//! Password hashing with bcrypt.

use crate::errors::{Error, Result};

/// bcrypt work factor used for all stored credentials.
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password for storage.
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, BCRYPT_COST)
        .map_err(|e| Error::internal(format!("Failed to hash password: {}", e)))
}

/// Check a plaintext password against a stored digest.
///
/// A malformed digest verifies as `false` rather than erroring, so a
/// corrupted row behaves like a wrong password.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}
